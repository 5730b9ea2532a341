use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::error::DataError;
use crate::network::Values;

/// One training example: input values by input node name and expected values
/// by output node name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub inputs: Values,
    pub expected: Values,
}

impl Example {
    pub fn new(inputs: Values, expected: Values) -> Example {
        Example { inputs, expected }
    }

    /// Convenience constructor from `(name, value)` pairs.
    pub fn from_pairs(inputs: &[(&str, f64)], expected: &[(&str, f64)]) -> Example {
        let collect = |pairs: &[(&str, f64)]| -> Values {
            pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
        };
        Example { inputs: collect(inputs), expected: collect(expected) }
    }
}

/// Indexable, countable source of examples consumed by the trainer.
pub trait Dataset {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Option<&Example>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dataset for [Example] {
    fn len(&self) -> usize {
        <[Example]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&Example> {
        <[Example]>::get(self, index)
    }
}

impl Dataset for Vec<Example> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn get(&self, index: usize) -> Option<&Example> {
        self.as_slice().get(index)
    }
}

/// An ordered collection of examples that can be split into random subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExampleSet {
    examples: Vec<Example>,
}

impl ExampleSet {
    pub fn new() -> ExampleSet {
        ExampleSet::default()
    }

    pub fn push(&mut self, example: Example) {
        self.examples.push(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Example> {
        self.examples.iter()
    }

    /// Splits flat rows into examples, taking `input_names` as inputs and
    /// `output_names` as expected values. Every row must carry every column.
    pub fn make_examples(
        rows: &[Values],
        input_names: &[&str],
        output_names: &[&str],
    ) -> Result<ExampleSet, DataError> {
        let pick = |row: &Values, names: &[&str]| -> Result<Values, DataError> {
            names.iter()
                .map(|name| {
                    row.get(*name)
                        .map(|v| (name.to_string(), *v))
                        .ok_or_else(|| DataError::MissingColumn(name.to_string()))
                })
                .collect()
        };
        let examples = rows.iter()
            .map(|row| Ok(Example::new(pick(row, input_names)?, pick(row, output_names)?)))
            .collect::<Result<Vec<_>, DataError>>()?;
        Ok(ExampleSet { examples })
    }

    /// Draws disjoint random subsets of the given sizes, without replacement.
    pub fn divide_random<R: Rng + ?Sized>(
        &self,
        sizes: &[usize],
        rng: &mut R,
    ) -> Result<Vec<ExampleSet>, DataError> {
        let requested: usize = sizes.iter().sum();
        if requested > self.examples.len() {
            return Err(DataError::PartitionTooLarge {
                requested,
                available: self.examples.len(),
            });
        }

        let mut indices: Vec<usize> = (0..self.examples.len()).collect();
        indices.shuffle(rng);

        let mut rest = indices.as_slice();
        let mut parts = Vec::with_capacity(sizes.len());
        for &size in sizes {
            let (taken, remaining) = rest.split_at(size);
            parts.push(ExampleSet {
                examples: taken.iter().map(|&i| self.examples[i].clone()).collect(),
            });
            rest = remaining;
        }
        Ok(parts)
    }

    /// Like `divide_random`, with each size given as a fraction of the set
    /// (rounded down). Fractions may sum to at most 1.0.
    pub fn divide_random_fraction<R: Rng + ?Sized>(
        &self,
        fractions: &[f64],
        rng: &mut R,
    ) -> Result<Vec<ExampleSet>, DataError> {
        let total: f64 = fractions.iter().sum();
        if total > 1.0 {
            return Err(DataError::FractionsExceedOne(total));
        }
        let n = self.examples.len() as f64;
        let sizes: Vec<usize> = fractions.iter().map(|f| (f * n).floor() as usize).collect();
        self.divide_random(&sizes, rng)
    }
}

impl Dataset for ExampleSet {
    fn len(&self) -> usize {
        self.examples.len()
    }

    fn get(&self, index: usize) -> Option<&Example> {
        self.examples.get(index)
    }
}

impl FromIterator<Example> for ExampleSet {
    fn from_iter<I: IntoIterator<Item = Example>>(iter: I) -> Self {
        ExampleSet { examples: iter.into_iter().collect() }
    }
}

impl From<Vec<Example>> for ExampleSet {
    fn from(examples: Vec<Example>) -> Self {
        ExampleSet { examples }
    }
}

impl<'a> IntoIterator for &'a ExampleSet {
    type Item = &'a Example;
    type IntoIter = std::slice::Iter<'a, Example>;

    fn into_iter(self) -> Self::IntoIter {
        self.examples.iter()
    }
}
