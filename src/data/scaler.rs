use crate::error::DataError;
use crate::network::Values;

/// Linear map of `[min, max]` onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeScaler {
    min: f64,
    max: f64,
}

impl Default for RangeScaler {
    fn default() -> Self {
        RangeScaler { min: 0.0, max: 10.0 }
    }
}

impl RangeScaler {
    pub fn new(min: f64, max: f64) -> Result<RangeScaler, DataError> {
        if min.is_nan() || max.is_nan() || max <= min {
            return Err(DataError::DegenerateRange { min, max });
        }
        Ok(RangeScaler { min, max })
    }

    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / (self.max - self.min)
    }

    pub fn unscale(&self, value: f64) -> f64 {
        value * (self.max - self.min) + self.min
    }
}

/// One-hot encoding of a fixed set of string labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KClassTranslator {
    keys: Vec<String>,
}

impl KClassTranslator {
    pub fn new<I, S>(keys: I) -> KClassTranslator
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        KClassTranslator { keys: keys.into_iter().map(Into::into).collect() }
    }

    pub fn output_size(&self) -> usize {
        self.keys.len()
    }

    pub fn translate(&self, value: &str) -> Result<Vec<f64>, DataError> {
        let position = self.keys.iter()
            .position(|k| k == value)
            .ok_or_else(|| DataError::UnknownClass(value.to_string()))?;
        let mut encoded = vec![0.0; self.keys.len()];
        encoded[position] = 1.0;
        Ok(encoded)
    }

    /// One-hot encoding keyed by class name, ready to use as the expected
    /// values of a network with one output node per class.
    pub fn translate_values(&self, value: &str) -> Result<Values, DataError> {
        let encoded = self.translate(value)?;
        Ok(self.keys.iter().cloned().zip(encoded).collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

/// Dummy coding of string labels: N classes become N - 1 outputs, and the
/// first class is the one with every output at 0.0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NMinusOneClassTranslator {
    keys: Vec<String>,
}

impl NMinusOneClassTranslator {
    pub fn new<I, S>(keys: I) -> NMinusOneClassTranslator
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        NMinusOneClassTranslator { keys: keys.into_iter().map(Into::into).collect() }
    }

    pub fn output_size(&self) -> usize {
        self.keys.len().saturating_sub(1)
    }

    pub fn translate(&self, value: &str) -> Result<Vec<f64>, DataError> {
        let position = self.keys.iter()
            .position(|k| k == value)
            .ok_or_else(|| DataError::UnknownClass(value.to_string()))?;
        let mut encoded = vec![0.0; self.output_size()];
        if position > 0 {
            encoded[position - 1] = 1.0;
        }
        Ok(encoded)
    }

    /// Encoding keyed by every class name but the first.
    pub fn translate_values(&self, value: &str) -> Result<Values, DataError> {
        let encoded = self.translate(value)?;
        Ok(self.keys.iter().skip(1).cloned().zip(encoded).collect())
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_scaler_maps_bounds() {
        let scaler = RangeScaler::new(-2.0, 6.0).unwrap();
        assert_eq!(scaler.scale(-2.0), 0.0);
        assert_eq!(scaler.scale(6.0), 1.0);
        assert_eq!(scaler.scale(2.0), 0.5);
        assert_eq!(scaler.unscale(0.5), 2.0);
        assert_eq!(RangeScaler::default().scale(5.0), 0.5);
    }

    #[test]
    fn range_scaler_rejects_empty_range() {
        assert_eq!(
            RangeScaler::new(1.0, 1.0),
            Err(DataError::DegenerateRange { min: 1.0, max: 1.0 })
        );
    }

    #[test]
    fn k_class_one_hot() {
        let t = KClassTranslator::new(["car", "plane", "boat", "train"]);
        assert_eq!(t.output_size(), 4);
        assert_eq!(t.translate("plane").unwrap(), vec![0.0, 1.0, 0.0, 0.0]);
        assert_eq!(t.translate("rocket"), Err(DataError::UnknownClass("rocket".into())));
    }

    #[test]
    fn n_minus_one_leaves_first_class_all_zero() {
        let t = NMinusOneClassTranslator::new(["car", "plane", "train", "boat"]);
        assert_eq!(t.output_size(), 3);
        assert_eq!(t.translate("car").unwrap(), vec![0.0, 0.0, 0.0]);
        assert_eq!(t.translate("plane").unwrap(), vec![1.0, 0.0, 0.0]);
        assert_eq!(t.translate("boat").unwrap(), vec![0.0, 0.0, 1.0]);
        assert_eq!(t.translate("rocket"), Err(DataError::UnknownClass("rocket".into())));

        let keyed = t.translate_values("train").unwrap();
        assert_eq!(keyed.keys().map(String::as_str).collect::<Vec<_>>(), ["boat", "plane", "train"]);
        assert_eq!(keyed["train"], 1.0);
        assert!(!keyed.contains_key("car"));
    }

    #[test]
    fn n_minus_one_with_a_single_class() {
        let t = NMinusOneClassTranslator::new(["only"]);
        assert_eq!(t.output_size(), 0);
        assert!(t.translate("only").unwrap().is_empty());
    }
}
