//! Built-in per-type validators.

mod base;
mod case;

pub mod array;
pub mod boolean;
pub mod combine;
pub mod integer;
pub mod null;
pub mod number;
pub mod object;
pub mod reference;
pub mod string;

pub use array::{ArrayValidator, ArrayValidatorFactory};
pub use base::base_validate;
pub use boolean::{BooleanValidator, BooleanValidatorFactory};
pub use combine::{CombineValidator, CombineValidatorFactory};
pub use integer::{IntegerValidator, IntegerValidatorFactory};
pub use null::{NullValidator, NullValidatorFactory};
pub use number::{NumberValidator, NumberValidatorFactory};
pub use object::{ObjectValidator, ObjectValidatorFactory};
pub use reference::{RefValidator, RefValidatorFactory};
pub use string::{matches_format, StringValidator, StringValidatorFactory};

use crate::master::ValidatorFactory;

/// One instance of every built-in validator factory.
pub fn builtin_factories() -> Vec<Box<dyn ValidatorFactory>> {
    vec![
        Box::new(BooleanValidatorFactory),
        Box::new(NullValidatorFactory),
        Box::new(NumberValidatorFactory),
        Box::new(IntegerValidatorFactory),
        Box::new(StringValidatorFactory),
        Box::new(ArrayValidatorFactory),
        Box::new(ObjectValidatorFactory),
        Box::new(CombineValidatorFactory),
        Box::new(RefValidatorFactory),
    ]
}
