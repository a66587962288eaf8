//! Classifier artifacts and their prediction rules.

use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::Deserialize;

use crate::PredictError;

/// A fitted classifier, tagged by `kind` in the artifact file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    Linear(LinearModel),
    DecisionTree(DecisionTree),
}

impl Classifier {
    /// Predicts one label per row of `x`.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>, PredictError> {
        match self {
            Classifier::Linear(m) => m.predict(x),
            Classifier::DecisionTree(t) => x.rows().into_iter().map(|row| t.predict_row(row)).collect(),
        }
    }

    pub fn classes(&self) -> &[String] {
        match self {
            Classifier::Linear(m) => &m.classes,
            Classifier::DecisionTree(t) => &t.classes,
        }
    }

    /// Number of input features, where the artifact defines it.
    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::Linear(m) => Some(m.coef.ncols()),
            Classifier::DecisionTree(_) => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Linear
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LinearArtifact {
    classes: Vec<String>,
    coef: Vec<Vec<f64>>,
    intercept: Vec<f64>,
}

/// Linear decision function (logistic regression, linear SVM).
///
/// Multiclass models carry one coefficient row per class. Binary models carry
/// a single row, positive decisions select `classes[1]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "LinearArtifact")]
pub struct LinearModel {
    classes: Vec<String>,
    coef: Array2<f64>,
    intercept: Array1<f64>,
}

impl TryFrom<LinearArtifact> for LinearModel {
    type Error = String;

    fn try_from(raw: LinearArtifact) -> Result<Self, Self::Error> {
        let rows = raw.coef.len();
        let width = raw.coef.first().map(Vec::len).unwrap_or_default();
        if raw.coef.iter().any(|row| row.len() != width) {
            return Err("coefficient rows must be of equal length".into());
        }
        let coef = Array2::from_shape_vec((rows, width), raw.coef.concat())
            .map_err(|e| e.to_string())?;
        Self::new(raw.classes, coef, Array1::from(raw.intercept))
    }
}

impl LinearModel {
    pub fn new(classes: Vec<String>, coef: Array2<f64>, intercept: Array1<f64>) -> Result<Self, String> {
        if classes.len() < 2 {
            return Err("linear model needs at least two classes".into());
        }
        let expected_rows = if classes.len() == 2 { 1 } else { classes.len() };
        if coef.nrows() != expected_rows {
            return Err(format!(
                "linear model with {} classes needs {} coefficient rows, found {}",
                classes.len(),
                expected_rows,
                coef.nrows()
            ));
        }
        if intercept.len() != expected_rows {
            return Err(format!(
                "linear model needs {} intercepts, found {}",
                expected_rows,
                intercept.len()
            ));
        }
        if coef.ncols() == 0 {
            return Err("coefficient rows must be non-empty".into());
        }
        Ok(Self { classes, coef, intercept })
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<String>, PredictError> {
        if x.ncols() != self.coef.ncols() {
            return Err(PredictError::Inference(format!(
                "X has {} features, but the classifier is expecting {} features as input",
                x.ncols(),
                self.coef.ncols()
            )));
        }

        let decisions = x.dot(&self.coef.t()) + &self.intercept;
        decisions
            .axis_iter(Axis(0))
            .map(|row| {
                let idx = if row.len() == 1 {
                    usize::from(row[0] > 0.0)
                } else {
                    argmax(row)
                };
                self.classes
                    .get(idx)
                    .cloned()
                    .ok_or_else(|| PredictError::Inference(format!("no class at index {}", idx)))
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Decision tree
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TreeArtifact {
    classes: Vec<String>,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

/// Decision tree in flattened array layout. Node 0 is the root; a node is a
/// leaf when `children_left[n] == -1`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "TreeArtifact")]
pub struct DecisionTree {
    classes: Vec<String>,
    children_left: Array1<i64>,
    children_right: Array1<i64>,
    feature: Array1<i64>,
    threshold: Array1<f64>,
    /// Per-node class weights, one row per node.
    value: Array2<f64>,
}

const LEAF: i64 = -1;

impl TryFrom<TreeArtifact> for DecisionTree {
    type Error = String;

    fn try_from(raw: TreeArtifact) -> Result<Self, Self::Error> {
        let n = raw.value.len();
        let n_classes = raw.classes.len();
        if raw.value.iter().any(|row| row.len() != n_classes) {
            return Err("every node needs one weight per class".into());
        }
        let value = Array2::from_shape_vec((n, n_classes), raw.value.concat())
            .map_err(|e| e.to_string())?;
        Self::new(
            raw.classes,
            Array1::from(raw.children_left),
            Array1::from(raw.children_right),
            Array1::from(raw.feature),
            Array1::from(raw.threshold),
            value,
        )
    }
}

impl DecisionTree {
    pub fn new(
        classes: Vec<String>,
        children_left: Array1<i64>,
        children_right: Array1<i64>,
        feature: Array1<i64>,
        threshold: Array1<f64>,
        value: Array2<f64>,
    ) -> Result<Self, String> {
        let n = children_left.len();
        if n == 0 {
            return Err("decision tree has no nodes".into());
        }
        if classes.is_empty() {
            return Err("decision tree has no classes".into());
        }
        if [children_right.len(), feature.len(), threshold.len(), value.nrows()]
            .iter()
            .any(|len| *len != n)
        {
            return Err("decision tree arrays must all have one entry per node".into());
        }
        if value.ncols() != classes.len() {
            return Err("every node needs one weight per class".into());
        }
        for node in 0..n {
            let (left, right) = (children_left[node], children_right[node]);
            if left == LEAF {
                continue;
            }
            let in_range = |child: i64| child > node as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(format!("node {} has out-of-range children", node));
            }
            if feature[node] < 0 {
                return Err(format!("split node {} has a negative feature index", node));
            }
        }
        Ok(Self {
            classes,
            children_left,
            children_right,
            feature,
            threshold,
            value,
        })
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> Result<String, PredictError> {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            let x = row.get(feature).ok_or_else(|| {
                PredictError::Inference(format!(
                    "X has {} features, but the tree splits on feature {}",
                    row.len(),
                    feature
                ))
            })?;
            node = if *x <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Ok(self.classes[argmax(self.value.row(node))].clone())
    }
}

/// Index of the largest value; the first one wins on ties.
fn argmax(values: ArrayView1<f64>) -> usize {
    values
        .indexed_iter()
        .fold((0, f64::NEG_INFINITY), |(best, best_v), (i, v)| {
            if *v > best_v {
                (i, *v)
            } else {
                (best, best_v)
            }
        })
        .0
}
