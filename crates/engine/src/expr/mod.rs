// Single-variable expression parsing and numeric evaluation

pub mod eval;
pub mod function;
pub mod numeric;
pub mod parser;

pub use function::{normalize_expression_syntax, parse_function_expression, ParsedExpression};
pub use numeric::{evaluate, first_derivative, second_derivative};
pub use parser::{parse, Expr, ExprError, Func, Op};
