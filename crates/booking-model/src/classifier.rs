//! Trained classifier artifacts.
//!
//! Three model families are supported, matching the estimators the training
//! notebooks export: logistic regression, a single decision tree and a random
//! forest of decision trees. Trees use the flat array encoding of fitted
//! scikit-learn trees (`children_left`, `children_right`, `feature`,
//! `threshold`, `value`), with `-1` marking a leaf.

use booking_core::constants::NUM_CLASSES;
use booking_core::error::{Error, Result};
use booking_core::traits::Classifier;
use booking_core::types::ClassProbabilities;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

const LEAF: i64 = -1;

/// Reject vectors the model was not trained for; never pad or truncate
fn check_input(features: &[f64], expected: usize) -> Result<()> {
    if features.len() != expected {
        return Err(Error::PredictionFailure(format!(
            "expected {expected} features, got {}",
            features.len()
        )));
    }
    if let Some(idx) = features.iter().position(|v| !v.is_finite()) {
        return Err(Error::PredictionFailure(format!(
            "feature at column {idx} is not a finite number"
        )));
    }
    Ok(())
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawLogisticRegression {
    coef: Vec<f64>,
    intercept: f64,
}

/// Binary logistic regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawLogisticRegression", into = "RawLogisticRegression")]
pub struct LogisticRegression {
    coef: Array1<f64>,
    intercept: f64,
}

impl LogisticRegression {
    /// Create from fitted coefficients
    pub fn new(coef: Vec<f64>, intercept: f64) -> Result<Self> {
        if coef.is_empty() {
            return Err(Error::InvalidArtifact(
                "logistic regression has no coefficients".to_string(),
            ));
        }
        if coef.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
            return Err(Error::InvalidArtifact(
                "logistic regression weights must be finite".to_string(),
            ));
        }
        Ok(Self {
            coef: Array1::from(coef),
            intercept,
        })
    }

    /// Raw decision value `w·x + b`
    pub fn decision_function(&self, features: &[f64]) -> Result<f64> {
        check_input(features, self.coef.len())?;
        Ok(self.coef.dot(&ArrayView1::from(features)) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities> {
        let z = self.decision_function(features)?;
        ClassProbabilities::from_positive(sigmoid(z))
    }
}

impl TryFrom<RawLogisticRegression> for LogisticRegression {
    type Error = Error;

    fn try_from(raw: RawLogisticRegression) -> Result<Self> {
        Self::new(raw.coef, raw.intercept)
    }
}

impl From<LogisticRegression> for RawLogisticRegression {
    fn from(model: LogisticRegression) -> Self {
        Self {
            coef: model.coef.to_vec(),
            intercept: model.intercept,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RawDecisionTree {
    n_features: usize,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<[f64; NUM_CLASSES]>,
}

/// Node of a validated tree
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(ClassProbabilities),
}

/// Binary decision tree classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDecisionTree", into = "RawDecisionTree")]
pub struct DecisionTree {
    n_features: usize,
    nodes: Vec<Node>,
    raw: RawDecisionTree,
}

impl DecisionTree {
    /// Create from flat node arrays.
    ///
    /// Children must come after their parent, which rules out cycles and
    /// bounds every traversal by the node count.
    pub fn from_arrays(
        n_features: usize,
        children_left: Vec<i64>,
        children_right: Vec<i64>,
        feature: Vec<i64>,
        threshold: Vec<f64>,
        value: Vec<[f64; NUM_CLASSES]>,
    ) -> Result<Self> {
        Self::try_from(RawDecisionTree {
            n_features,
            children_left,
            children_right,
            feature,
            threshold,
            value,
        })
    }

    /// Number of nodes
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn leaf_probabilities(&self, features: &[f64]) -> ClassProbabilities {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(probs) => return *probs,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn name(&self) -> &str {
        "decision_tree"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities> {
        check_input(features, self.n_features)?;
        Ok(self.leaf_probabilities(features))
    }
}

impl TryFrom<RawDecisionTree> for DecisionTree {
    type Error = Error;

    fn try_from(raw: RawDecisionTree) -> Result<Self> {
        let n = raw.children_left.len();
        if n == 0 {
            return Err(Error::InvalidArtifact("decision tree has no nodes".to_string()));
        }
        if raw.n_features == 0 {
            return Err(Error::InvalidArtifact(
                "decision tree has zero input features".to_string(),
            ));
        }
        if [
            raw.children_right.len(),
            raw.feature.len(),
            raw.threshold.len(),
            raw.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(Error::InvalidArtifact(
                "decision tree node arrays differ in length".to_string(),
            ));
        }

        let child = |node: usize, c: i64| -> Result<usize> {
            usize::try_from(c)
                .ok()
                .filter(|&c| c > node && c < n)
                .ok_or_else(|| {
                    Error::InvalidArtifact(format!("node {node} has invalid child {c}"))
                })
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (left, right) = (raw.children_left[i], raw.children_right[i]);
            if left == LEAF && right == LEAF {
                let [c0, c1] = raw.value[i];
                let total = c0 + c1;
                if c0 < 0.0 || c1 < 0.0 || !total.is_finite() || total <= 0.0 {
                    return Err(Error::InvalidArtifact(format!(
                        "leaf {i} has invalid class weights {:?}",
                        raw.value[i]
                    )));
                }
                let probs = ClassProbabilities::new(c0 / total, c1 / total)
                    .map_err(|e| Error::InvalidArtifact(e.to_string()))?;
                nodes.push(Node::Leaf(probs));
            } else {
                let feature = usize::try_from(raw.feature[i])
                    .ok()
                    .filter(|&f| f < raw.n_features)
                    .ok_or_else(|| {
                        Error::InvalidArtifact(format!(
                            "node {i} splits on invalid feature {}",
                            raw.feature[i]
                        ))
                    })?;
                let threshold = raw.threshold[i];
                if !threshold.is_finite() {
                    return Err(Error::InvalidArtifact(format!(
                        "node {i} has a non-finite threshold"
                    )));
                }
                nodes.push(Node::Split {
                    feature,
                    threshold,
                    left: child(i, left)?,
                    right: child(i, right)?,
                });
            }
        }

        Ok(Self {
            n_features: raw.n_features,
            nodes,
            raw,
        })
    }
}

impl From<DecisionTree> for RawDecisionTree {
    fn from(tree: DecisionTree) -> Self {
        tree.raw
    }
}

/// Random forest: the mean of its trees' leaf distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DecisionTree>", into = "Vec<DecisionTree>")]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Create from fitted trees; all trees must share the input width
    pub fn new(trees: Vec<DecisionTree>) -> Result<Self> {
        let Some(first) = trees.first() else {
            return Err(Error::InvalidArtifact("random forest has no trees".to_string()));
        };
        let width = first.n_features;
        if trees.iter().any(|t| t.n_features != width) {
            return Err(Error::InvalidArtifact(
                "random forest trees disagree on input width".to_string(),
            ));
        }
        Ok(Self { trees })
    }

    /// Number of trees
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.trees[0].n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities> {
        check_input(features, self.n_features())?;
        let sum = self
            .trees
            .iter()
            .map(|tree| tree.leaf_probabilities(features).not_canceled())
            .sum::<f64>();
        ClassProbabilities::from_positive(sum / self.trees.len() as f64)
    }
}

impl TryFrom<Vec<DecisionTree>> for RandomForest {
    type Error = Error;

    fn try_from(trees: Vec<DecisionTree>) -> Result<Self> {
        Self::new(trees)
    }
}

impl From<RandomForest> for Vec<DecisionTree> {
    fn from(forest: RandomForest) -> Self {
        forest.trees
    }
}

/// Any supported classifier artifact, tagged by model family
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierArtifact {
    /// Logistic regression
    LogisticRegression(LogisticRegression),
    /// Single decision tree
    DecisionTree(DecisionTree),
    /// Random forest
    RandomForest(RandomForest),
}

impl ClassifierArtifact {
    fn inner(&self) -> &dyn Classifier {
        match self {
            ClassifierArtifact::LogisticRegression(m) => m,
            ClassifierArtifact::DecisionTree(m) => m,
            ClassifierArtifact::RandomForest(m) => m,
        }
    }
}

impl Classifier for ClassifierArtifact {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<ClassProbabilities> {
        self.inner().predict_proba(features)
    }
}

impl From<LogisticRegression> for ClassifierArtifact {
    fn from(model: LogisticRegression) -> Self {
        ClassifierArtifact::LogisticRegression(model)
    }
}

impl From<DecisionTree> for ClassifierArtifact {
    fn from(model: DecisionTree) -> Self {
        ClassifierArtifact::DecisionTree(model)
    }
}

impl From<RandomForest> for ClassifierArtifact {
    fn from(model: RandomForest) -> Self {
        ClassifierArtifact::RandomForest(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::types::BookingClass;

    /// Root splits on feature 0 at 0.5; leaves favour class 1 on the left
    fn stump(n_features: usize) -> DecisionTree {
        DecisionTree::from_arrays(
            n_features,
            vec![1, LEAF, LEAF],
            vec![2, LEAF, LEAF],
            vec![0, -2, -2],
            vec![0.5, -2.0, -2.0],
            vec![[50.0, 50.0], [10.0, 30.0], [30.0, 10.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_logistic_probabilities() {
        let model = LogisticRegression::new(vec![1.0, -1.0], 0.0).unwrap();

        let probs = model.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((probs.not_canceled() - 0.5).abs() < 1e-12);
        assert_eq!(probs.predicted_class(), BookingClass::Canceled);

        let probs = model.predict_proba(&[3.0, 0.0]).unwrap();
        assert!(probs.not_canceled() > 0.95);
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), BookingClass::NotCanceled);
    }

    #[test]
    fn test_sigmoid_is_stable() {
        assert!((sigmoid(-800.0)).abs() < 1e-300);
        assert!((sigmoid(800.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shape_mismatch_is_prediction_failure() {
        let model = LogisticRegression::new(vec![1.0, 1.0, 1.0], 0.0).unwrap();
        assert!(matches!(
            model.predict_proba(&[1.0, 2.0]),
            Err(Error::PredictionFailure(_))
        ));
        assert!(matches!(
            model.predict_proba(&[1.0, 2.0, 3.0, 4.0]),
            Err(Error::PredictionFailure(_))
        ));
        assert!(matches!(
            model.predict_proba(&[1.0, f64::NAN, 3.0]),
            Err(Error::PredictionFailure(_))
        ));
    }

    #[test]
    fn test_tree_traversal() {
        let tree = stump(2);
        let left = tree.predict_proba(&[0.5, 9.0]).unwrap();
        assert!((left.not_canceled() - 0.75).abs() < 1e-12);

        let right = tree.predict_proba(&[0.6, 9.0]).unwrap();
        assert!((right.canceled() - 0.75).abs() < 1e-12);
        assert_eq!(tree.predict(&[0.6, 9.0]).unwrap(), BookingClass::Canceled);
    }

    #[test]
    fn test_tree_validation() {
        // child pointing backwards
        assert!(DecisionTree::from_arrays(
            1,
            vec![0, LEAF],
            vec![1, LEAF],
            vec![0, -2],
            vec![0.0, -2.0],
            vec![[1.0, 1.0], [1.0, 1.0]],
        )
        .is_err());

        // split feature out of range
        assert!(DecisionTree::from_arrays(
            1,
            vec![1, LEAF, LEAF],
            vec![2, LEAF, LEAF],
            vec![3, -2, -2],
            vec![0.0, -2.0, -2.0],
            vec![[1.0, 1.0], [1.0, 0.0], [0.0, 1.0]],
        )
        .is_err());

        // empty leaf
        assert!(DecisionTree::from_arrays(1, vec![LEAF], vec![LEAF], vec![-2], vec![-2.0], vec![[0.0, 0.0]]).is_err());

        // ragged arrays
        assert!(DecisionTree::from_arrays(1, vec![LEAF], vec![], vec![-2], vec![-2.0], vec![[1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_forest_averages_trees() {
        let always_one = DecisionTree::from_arrays(2, vec![LEAF], vec![LEAF], vec![-2], vec![-2.0], vec![[0.0, 4.0]]).unwrap();
        let forest = RandomForest::new(vec![stump(2), always_one]).unwrap();

        let probs = forest.predict_proba(&[1.0, 0.0]).unwrap();
        assert!((probs.not_canceled() - 0.625).abs() < 1e-12);
        assert_eq!(forest.n_trees(), 2);
    }

    #[test]
    fn test_forest_rejects_mixed_widths() {
        assert!(RandomForest::new(vec![stump(2), stump(3)]).is_err());
        assert!(RandomForest::new(Vec::new()).is_err());
    }

    #[test]
    fn test_artifact_json_format() {
        let json = r#"{"logistic_regression": {"coef": [0.5, -0.25], "intercept": 0.1}}"#;
        let model: ClassifierArtifact = serde_json::from_str(json).unwrap();
        assert_eq!(model.name(), "logistic_regression");
        assert_eq!(model.n_features(), 2);

        let back = serde_json::to_string(&model).unwrap();
        let again: ClassifierArtifact = serde_json::from_str(&back).unwrap();
        assert_eq!(again, model);
    }

    #[test]
    fn test_artifact_bincode_format() {
        let model = ClassifierArtifact::from(RandomForest::new(vec![stump(2)]).unwrap());
        let bytes = bincode::serialize(&model).unwrap();
        let decoded: ClassifierArtifact = bincode::deserialize(&bytes).unwrap();
        assert_eq!(decoded, model);
    }
}
