//! Built-in per-type compilers.

mod base;

pub mod array;
pub mod boolean;
pub mod combine;
pub mod integer;
pub mod null;
pub mod number;
pub mod object;
pub mod reference;
pub mod string;

pub use array::ArrayCompiler;
pub use boolean::BooleanCompiler;
pub use combine::CombineCompiler;
pub use integer::IntegerCompiler;
pub use null::NullCompiler;
pub use number::NumberCompiler;
pub use object::ObjectCompiler;
pub use reference::RefCompiler;
pub use string::StringCompiler;

use crate::master::SchemaCompiler;

/// One instance of every built-in compiler.
pub fn builtin_compilers() -> Vec<Box<dyn SchemaCompiler>> {
    vec![
        Box::new(BooleanCompiler),
        Box::new(NullCompiler),
        Box::new(NumberCompiler),
        Box::new(IntegerCompiler),
        Box::new(StringCompiler),
        Box::new(ArrayCompiler),
        Box::new(ObjectCompiler),
        Box::new(CombineCompiler),
        Box::new(RefCompiler),
    ]
}
