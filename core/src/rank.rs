use crate::graph::LinkGraph;

pub const DAMPING: f64 = 0.85;

/// Damped power iteration over a column-normalized link graph.
///
/// The stopping rule is pluggable. The default is elementwise exact
/// equality of successive score vectors, matching the reference behavior;
/// round-off can keep that from ever triggering on larger graphs, so
/// [`within_tolerance`] can be substituted.
pub struct RankEngine {
    damping: f64,
    converged: Box<dyn Fn(&[f64], &[f64]) -> bool + Send + Sync>,
}

impl Default for RankEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RankEngine {
    pub fn new() -> Self {
        Self {
            damping: DAMPING,
            converged: Box::new(exact_equality),
        }
    }

    /// Replaces the stopping rule.
    pub fn with_convergence(
        mut self,
        predicate: impl Fn(&[f64], &[f64]) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.converged = Box::new(predicate);
        self
    }

    /// Column-normalizes the adjacency matrix into transition columns.
    ///
    /// Columns with out-degree > 0 are divided by the degree and sum to 1.
    /// A dangling column gets 1/N off-diagonal with a forced zero diagonal,
    /// so it does not sum to 1; changing that policy changes the scores.
    pub fn normalize(&self, graph: &LinkGraph) -> Vec<Vec<f64>> {
        let n = graph.n;
        let mut matrix = graph.matrix.clone();
        for j in 0..n {
            let degree: f64 = (0..n).map(|i| matrix[i][j]).sum();
            for i in 0..n {
                if degree != 0.0 {
                    matrix[i][j] /= degree;
                } else if i != j {
                    matrix[i][j] = 1.0 / n as f64;
                } else {
                    matrix[i][j] = 0.0;
                }
            }
        }
        matrix
    }

    /// Iterates `score = d · M · score + (1 − d) · 1⃗` from the all-ones
    /// vector until the stopping rule accepts two successive vectors.
    pub fn run(&self, graph: &LinkGraph) -> Vec<f64> {
        let n = graph.n;
        if n == 0 {
            return Vec::new();
        }
        let matrix = self.normalize(graph);
        let mut scores = vec![1.0; n];
        let mut iterations = 0usize;
        loop {
            let mut next = vec![1.0 - self.damping; n];
            for (i, row) in matrix.iter().enumerate() {
                let weighted: f64 = row.iter().zip(&scores).map(|(m, s)| m * s).sum();
                next[i] += self.damping * weighted;
            }
            iterations += 1;
            let done = (self.converged)(&next, &scores);
            scores = next;
            if done {
                break;
            }
        }
        tracing::debug!(iterations, pages = n, "rank iteration converged");
        scores
    }
}

/// Reference stopping rule: bitwise-identical successive vectors.
pub fn exact_equality(current: &[f64], previous: &[f64]) -> bool {
    current.iter().zip(previous).all(|(a, b)| a == b)
}

/// Tolerance-based stopping rule for graphs where exact equality may never
/// be reached.
pub fn within_tolerance(epsilon: f64) -> impl Fn(&[f64], &[f64]) -> bool + Send + Sync {
    move |current, previous| {
        current
            .iter()
            .zip(previous)
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::LinkGraph;

    // A links to B and C; B links to C; C links nowhere.
    fn three_page_graph() -> LinkGraph {
        let mut graph = LinkGraph::new(3);
        graph.add_edge(1, 0);
        graph.add_edge(2, 0);
        graph.add_edge(2, 1);
        graph
    }

    #[test]
    fn linked_columns_are_stochastic() {
        let graph = three_page_graph();
        let matrix = RankEngine::new().normalize(&graph);
        for j in 0..2 {
            let sum: f64 = (0..3).map(|i| matrix[i][j]).sum();
            assert!((sum - 1.0).abs() < 1e-12, "column {j} sums to {sum}");
        }
        assert_eq!(matrix[1][0], 0.5);
        assert_eq!(matrix[2][0], 0.5);
        assert_eq!(matrix[2][1], 1.0);
    }

    #[test]
    fn dangling_column_gets_uniform_mass_and_zero_diagonal() {
        let graph = three_page_graph();
        let matrix = RankEngine::new().normalize(&graph);
        assert_eq!(matrix[0][2], 1.0 / 3.0);
        assert_eq!(matrix[1][2], 1.0 / 3.0);
        assert_eq!(matrix[2][2], 0.0);
    }

    #[test]
    fn most_linked_page_ranks_highest() {
        let graph = three_page_graph();
        let engine = RankEngine::new().with_convergence(within_tolerance(1e-12));
        let scores = engine.run(&graph);
        assert!(scores[2] > scores[1], "C should outrank B: {scores:?}");
        assert!(scores[1] > scores[0], "B should outrank A: {scores:?}");
    }

    #[test]
    fn exact_equality_terminates_on_trivial_graph() {
        // A single page maps to the fixed point 0.15 in one step and then
        // reproduces it bit for bit.
        let graph = LinkGraph::new(1);
        let scores = RankEngine::new().run(&graph);
        assert_eq!(scores.len(), 1);
        assert!(scores[0] > 0.0);
    }

    #[test]
    fn empty_graph_yields_no_scores() {
        let scores = RankEngine::new().run(&LinkGraph::new(0));
        assert!(scores.is_empty());
    }
}
