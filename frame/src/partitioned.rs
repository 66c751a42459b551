use rayon::prelude::*;

/// An ordered collection split in partitions, processed one task per partition.
///
/// `map` style operations run every partition on the rayon pool the caller is
/// installed in; results keep the partition order, so `collect` is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned<T> {
    parts: Vec<T>,
}

impl<T> Partitioned<T> {
    /// Creates a new `Partitioned` collection.
    ///
    /// # Arguments
    /// * `parts` - One element per partition, in partition order.
    pub fn new(parts: Vec<T>) -> Self {
        Self { parts }
    }

    /// Returns the amount of partitions.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.parts.iter()
    }

    /// Gathers every partition's element to the caller, in partition order.
    pub fn collect(self) -> Vec<T> {
        self.parts
    }
}

impl<T: Send> Partitioned<T> {
    /// Consumes each partition with `f`, running one task per partition.
    ///
    /// # Arguments
    /// * `f` - Receives the partition index and its element.
    ///
    /// # Returns
    /// The mapped collection, same partitioning.
    pub fn map<U, F>(self, f: F) -> Partitioned<U>
    where
        U: Send,
        F: Fn(usize, T) -> U + Sync + Send,
    {
        let parts = self
            .parts
            .into_par_iter()
            .enumerate()
            .map(|(i, part)| f(i, part))
            .collect();

        Partitioned { parts }
    }

    /// Like `map` but for fallible closures.
    ///
    /// Every partition runs to completion; when several fail, the error of the
    /// lowest partition index is returned.
    pub fn try_map<U, E, F>(self, f: F) -> Result<Partitioned<U>, E>
    where
        U: Send,
        E: Send,
        F: Fn(usize, T) -> Result<U, E> + Sync + Send,
    {
        let results: Vec<Result<U, E>> = self
            .parts
            .into_par_iter()
            .enumerate()
            .map(|(i, part)| f(i, part))
            .collect();

        let parts = results.into_iter().collect::<Result<Vec<_>, E>>()?;
        Ok(Partitioned { parts })
    }
}

impl<T: Sync> Partitioned<T> {
    /// Borrowing version of `try_map`, leaves `self` untouched.
    pub fn try_map_ref<U, E, F>(&self, f: F) -> Result<Partitioned<U>, E>
    where
        U: Send,
        E: Send,
        F: Fn(usize, &T) -> Result<U, E> + Sync + Send,
    {
        let results: Vec<Result<U, E>> = self
            .parts
            .par_iter()
            .enumerate()
            .map(|(i, part)| f(i, part))
            .collect();

        let parts = results.into_iter().collect::<Result<Vec<_>, E>>()?;
        Ok(Partitioned { parts })
    }
}

impl<T> FromIterator<T> for Partitioned<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> IntoIterator for Partitioned<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.into_iter()
    }
}
