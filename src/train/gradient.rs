/// Per-node training state: epoch-cumulative partial derivatives plus the
/// weight deltas they turn into at the end of an epoch.
///
/// Partials are *not* reset between examples; one epoch's worth of
/// `delta * input` products is summed and applied once, batch style.
#[derive(Debug, Clone)]
pub struct GradientAccumulator {
    pub learning_rate: f64,
    pub momentum: f64,
    delta: f64,
    partial_derivatives: Option<Vec<f64>>,
    weight_deltas: Vec<f64>,
    prior_weight_deltas: Vec<f64>,
}

impl Default for GradientAccumulator {
    fn default() -> Self {
        GradientAccumulator::new(0.2, 0.0)
    }
}

impl GradientAccumulator {
    pub fn new(learning_rate: f64, momentum: f64) -> GradientAccumulator {
        GradientAccumulator {
            learning_rate,
            momentum,
            delta: f64::NAN,
            partial_derivatives: None,
            weight_deltas: Vec::new(),
            prior_weight_deltas: Vec::new(),
        }
    }

    /// Sizes the delta buffers to the owning node's input count and forgets
    /// any momentum history.
    pub fn resize(&mut self, inputs: usize) {
        self.weight_deltas = vec![0.0; inputs];
        self.prior_weight_deltas = vec![0.0; inputs];
        self.partial_derivatives = None;
    }

    /// Delta at an output node: `-(expected - actual) * f'(raw)`.
    pub fn output_delta(&mut self, expected: f64, actual: f64, derivative: f64) -> f64 {
        self.delta = -(expected - actual) * derivative;
        self.delta
    }

    /// Delta at a hidden node. Feedback values arrive already multiplied by
    /// the connecting weight, so only the sum is needed.
    pub fn hidden_delta(&mut self, feedback: &[f64], derivative: f64) -> f64 {
        self.delta = feedback.iter().sum::<f64>() * derivative;
        self.delta
    }

    pub fn accumulate(&mut self, inputs: &[f64], delta: f64) {
        let partials = self
            .partial_derivatives
            .get_or_insert_with(|| vec![0.0; inputs.len()]);
        if partials.len() < inputs.len() {
            partials.resize(inputs.len(), 0.0);
        }
        for (p, x) in partials.iter_mut().zip(inputs) {
            *p += delta * x;
        }
        // a node restored without training state still gets full-width deltas
        if self.weight_deltas.len() < inputs.len() {
            self.weight_deltas.resize(inputs.len(), 0.0);
            self.prior_weight_deltas.resize(inputs.len(), 0.0);
        }
    }

    /// `weight_delta[i] = -lr * partial[i] + momentum * prior[i]`.
    ///
    /// A node that saw no feedback this epoch has no partials and contributes
    /// only its momentum term.
    pub fn compute_weight_delta(&mut self) {
        let n = self.weight_deltas.len();
        if self.prior_weight_deltas.len() != n {
            self.prior_weight_deltas.resize(n, 0.0);
        }
        for i in 0..n {
            let partial = self
                .partial_derivatives
                .as_ref()
                .and_then(|p| p.get(i).copied())
                .unwrap_or(0.0);
            self.weight_deltas[i] =
                -self.learning_rate * partial + self.momentum * self.prior_weight_deltas[i];
        }
    }

    pub fn apply(&self, weights: &mut [f64]) {
        for (w, dw) in weights.iter_mut().zip(&self.weight_deltas) {
            *w += dw;
        }
    }

    pub fn end_epoch(&mut self) {
        self.prior_weight_deltas = std::mem::replace(
            &mut self.weight_deltas,
            vec![0.0; self.prior_weight_deltas.len()],
        );
        self.partial_derivatives = None;
    }

    /// Throws away this epoch's partials without touching momentum history.
    pub fn discard_partials(&mut self) {
        self.partial_derivatives = None;
        self.weight_deltas.iter_mut().for_each(|dw| *dw = 0.0);
    }

    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn partial_derivatives(&self) -> Option<&[f64]> {
        self.partial_derivatives.as_deref()
    }

    pub fn weight_deltas(&self) -> &[f64] {
        &self.weight_deltas
    }

    pub fn prior_weight_deltas(&self) -> &[f64] {
        &self.prior_weight_deltas
    }
}
