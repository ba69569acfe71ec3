//! Joins generated fragments into the final text blob.

/// Collects fragments in order and joins the non-blank ones with newlines.
///
/// Each fragment is trimmed before it is kept, so the output never carries a
/// trailing blank statement.
#[derive(Debug, Clone, Default)]
pub struct TextAssembler {
    fragments: Vec<String>,
}

impl TextAssembler {
    /// Creates an empty assembler.
    #[must_use]
    pub const fn new() -> Self {
        Self { fragments: vec![] }
    }

    /// Appends one fragment. Blank fragments are dropped.
    pub fn push(&mut self, fragment: impl AsRef<str>) {
        let fragment = fragment.as_ref().trim();
        if !fragment.is_empty() {
            self.fragments.push(String::from(fragment));
        }
    }

    /// Appends every fragment of an iterator.
    pub fn extend<I>(&mut self, fragments: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        for fragment in fragments {
            self.push(fragment);
        }
    }

    /// Returns true if no fragment has been kept.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Joins the kept fragments with `\n`.
    #[must_use]
    pub fn finish(self) -> String {
        self.fragments.join("\n")
    }
}

/// Strips blank fragments and joins the rest with newlines, in order.
#[must_use]
pub fn assemble<I>(fragments: I) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut assembler = TextAssembler::new();
    assembler.extend(fragments);
    assembler.finish()
}
