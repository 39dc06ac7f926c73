//! Cursor over an ordered slice of sibling elements.
//!
//! Parse steps that consume a variable number of siblings (an argument
//! followed by an optional `= default`) move the cursor themselves. The
//! cursor is always passed explicitly; nothing here is shared state.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("index {index} is out of range for {len} elements")]
    OutOfRange { index: usize, len: usize },

    #[error("step at index {index} did not advance the scanner")]
    Stalled { index: usize },
}

/// Whether [`ListScanner::run`] advances after each step or the step must.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Auto,
    Manual,
}

#[derive(Debug, Clone)]
pub struct ListScanner<'a, T> {
    items: &'a [T],
    index: usize,
}

impl<'a, T> ListScanner<'a, T> {
    pub fn new(items: &'a [T]) -> Self {
        Self::starting_at(items, 0)
    }

    pub fn starting_at(items: &'a [T], index: usize) -> Self {
        Self {
            items,
            index: index.min(items.len()),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.items.len()
    }

    /// Element at the cursor
    pub fn current(&self) -> Result<&'a T, ScanError> {
        self.items.get(self.index).ok_or(ScanError::OutOfRange {
            index: self.index,
            len: self.items.len(),
        })
    }

    /// True if there is an element after the current one
    pub fn can_advance(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    /// Move to the next element and return it.
    ///
    /// Past the end this yields `Ok(None)`, or an error when `expect` is set.
    pub fn advance(&mut self, expect: bool) -> Result<Option<&'a T>, ScanError> {
        self.index = (self.index + 1).min(self.items.len());
        match self.current() {
            Ok(item) => Ok(Some(item)),
            Err(err) if expect => Err(err),
            Err(_) => Ok(None),
        }
    }

    /// Call `step` with the current element until the scanner is exhausted.
    ///
    /// With [`Advance::Manual`] every step has to move the cursor; a step
    /// that leaves it in place fails with [`ScanError::Stalled`] instead of
    /// looping forever. Calling `run` again resumes from the current index.
    pub fn run<E, F>(&mut self, mode: Advance, mut step: F) -> Result<(), E>
    where
        E: From<ScanError>,
        F: FnMut(&mut Self, &'a T) -> Result<(), E>,
    {
        let items = self.items;
        while let Some(item) = items.get(self.index) {
            let before = self.index;
            step(self, item)?;
            match mode {
                Advance::Auto => {
                    self.advance(false)?;
                }
                Advance::Manual if self.index == before => {
                    return Err(ScanError::Stalled { index: before }.into());
                }
                Advance::Manual => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_and_advance() {
        let items = [1, 2, 3];
        let mut scanner = ListScanner::new(&items);

        assert_eq!(scanner.current(), Ok(&1));
        assert!(scanner.can_advance());
        assert_eq!(scanner.advance(false), Ok(Some(&2)));
        assert_eq!(scanner.advance(true), Ok(Some(&3)));
        assert!(!scanner.can_advance());
        assert_eq!(scanner.advance(false), Ok(None));
        assert!(scanner.is_exhausted());
        assert_eq!(
            scanner.advance(true),
            Err(ScanError::OutOfRange { index: 3, len: 3 })
        );
        assert!(scanner.current().is_err());
    }

    #[test]
    fn test_auto_run_visits_everything() {
        let items = ["a", "b", "c"];
        let mut scanner = ListScanner::new(&items);
        let mut seen = Vec::new();

        scanner
            .run::<ScanError, _>(Advance::Auto, |_, item| {
                seen.push(*item);
                Ok(())
            })
            .unwrap();

        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_manual_run_can_consume_pairs() {
        let items = ["x", "=", "1", "y"];
        let mut scanner = ListScanner::new(&items);
        let mut pairs = Vec::new();

        scanner
            .run::<ScanError, _>(Advance::Manual, |scanner, name| {
                let mut value = None;
                if scanner.advance(false)? == Some(&"=") {
                    value = scanner.advance(true)?.copied();
                    scanner.advance(false)?;
                }
                pairs.push((*name, value));
                Ok(())
            })
            .unwrap();

        assert_eq!(pairs, vec![("x", Some("1")), ("y", None)]);
    }

    #[test]
    fn test_manual_run_detects_stalled_step() {
        let items = [1, 2];
        let mut scanner = ListScanner::new(&items);

        let result = scanner.run::<ScanError, _>(Advance::Manual, |_, _| Ok(()));
        assert_eq!(result, Err(ScanError::Stalled { index: 0 }));
    }

    #[test]
    fn test_run_resumes_from_current_index() {
        let items = [1, 2, 3];
        let mut scanner = ListScanner::starting_at(&items, 1);
        let mut total = 0;

        scanner
            .run::<ScanError, _>(Advance::Auto, |_, item| {
                total += item;
                Ok(())
            })
            .unwrap();

        assert_eq!(total, 5);
    }
}
