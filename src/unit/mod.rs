//! Synthetic compilation unit.
//!
//! A document's inline code is decomposed into fragments and laid out as
//! one TypeScript program with three delimited regions:
//!
//! ```text
//! /*<declarations open>*/
//! ;
//! let box = document.getElementById('box')!;
//! /*<declarations close>*/
//! ;
//! /*<handlers open>*/
//! ;
//! document.getElementById('__tshtml_1f2e3d4c').onclick = (event) => {
//! document.getElementById('__tshtml_1f2e3d4c')!.remove()
//! };
//! /*{"id":…,"kind":"handler",…}*/
//! ;
//! /*<handlers close>*/
//! ;
//! /*<main open>*/
//! ;
//! console.log(1)
//! /*{"id":…,"kind":"script",…}*/
//! ;
//! /*<main close>*/
//! ;
//! <prelude>
//! ```
//!
//! The lone `;` lines are empty statements. A comment is emitted attached to
//! the statement after it, and empty statements always survive compilation,
//! so markers and annotations stay in place even when the code before them is
//! erased (interfaces, `declare` statements).

mod assemble;
mod decompose;
mod handlers;
mod import_map;
mod selfref;

pub use assemble::assemble;
pub use decompose::decompose;
pub use handlers::HandlerMode;
pub use selfref::unbind;

use crate::annotation::Annotation;
use std::fmt;
use uuid::Uuid;

/// Empty statement following every marker and annotation line.
pub const ANCHOR: &str = ";";

/// The three regions of a unit, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Declarations,
    Handlers,
    Main,
}

impl Region {
    pub const ALL: [Self; 3] = [Self::Declarations, Self::Handlers, Self::Main];

    const fn index(self) -> usize {
        match self {
            Self::Declarations => 0,
            Self::Handlers => 1,
            Self::Main => 2,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Declarations => "declarations",
            Self::Handlers => "handlers",
            Self::Main => "main",
        })
    }
}

/// Region delimiters, fresh for every compilation.
#[derive(Debug, Clone)]
pub struct BoundaryTokens {
    open: [String; 3],
    close: [String; 3],
}

impl BoundaryTokens {
    pub fn new() -> Self {
        let token = || format!("/*{}*/", Uuid::new_v4().simple());
        Self {
            open: std::array::from_fn(|_| token()),
            close: std::array::from_fn(|_| token()),
        }
    }

    pub fn open(&self, region: Region) -> &str {
        &self.open[region.index()]
    }

    pub fn close(&self, region: Region) -> &str {
        &self.close[region.index()]
    }
}

impl Default for BoundaryTokens {
    fn default() -> Self {
        Self::new()
    }
}

/// Code extracted from one node, tagged with where it came from.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub code: String,
    pub annotation: Annotation,
}

/// Everything extracted from one document.
#[derive(Debug, Default)]
pub struct Decomposition {
    /// `let <id> = document.getElementById('<id>')!;` lines.
    pub declarations: Vec<String>,
    /// Wrapped handler bodies.
    pub handlers: Vec<Fragment>,
    /// Script container bodies (or their import form).
    pub scripts: Vec<Fragment>,
}

impl Decomposition {
    /// Whether any handler or script needs compiling. Declarations alone
    /// produce nothing to write back.
    pub fn has_fragments(&self) -> bool {
        !self.handlers.is_empty() || !self.scripts.is_empty()
    }

    /// Number of annotated fragments per region.
    pub fn fragment_count(&self, region: Region) -> usize {
        match region {
            Region::Declarations => 0,
            Region::Handlers => self.handlers.len(),
            Region::Main => self.scripts.len(),
        }
    }
}
