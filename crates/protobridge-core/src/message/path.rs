use std::fmt::{self, Display};

///
/// Step
///
/// One hop from a value to a nested value.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Step {
    Field(u32),
    Index(usize),
    Key(String),
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(number) => write!(f, "#{number}"),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) => write!(f, "[{key:?}]"),
        }
    }
}

///
/// Location
///
/// Path from the document root message to a value. The empty location is
/// the root itself.
///

#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Location {
    steps: Vec<Step>,
}

impl Location {
    #[must_use]
    pub const fn root() -> Self {
        Self { steps: Vec::new() }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn child(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);

        Self { steps }
    }

    #[must_use]
    pub fn field(&self, number: u32) -> Self {
        self.child(Step::Field(number))
    }

    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        self.child(Step::Index(index))
    }

    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        self.child(Step::Key(key.into()))
    }

    /// Append a run of field numbers, as carried by a property path.
    #[must_use]
    pub fn fields(&self, numbers: &[u32]) -> Self {
        let mut steps = self.steps.clone();
        steps.extend(numbers.iter().copied().map(Step::Field));

        Self { steps }
    }

    /// Split into the location of the owning message and the final field
    /// number, when the last step is a field.
    #[must_use]
    pub fn split_field(&self) -> Option<(&[Step], u32)> {
        match self.steps.split_last() {
            Some((Step::Field(number), parent)) => Some((parent, *number)),
            _ => None,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("$");
        }
        for step in &self.steps {
            write!(f, "{step}")?;
        }

        Ok(())
    }
}
