//! Built-in XPath 1.0 functions supported in mapping expressions.

use super::engine::{EvaluationContext, XPathValue};
use crate::datasource::DataSourceNode;
use crate::error::XPathError;

type FnResult<N> = Result<XPathValue<N>, XPathError>;

fn arity_error<N>(function: &str, expected: &str) -> FnResult<N> {
    Err(XPathError::FunctionError {
        function: function.to_string(),
        message: format!("Expected {} argument(s)", expected),
    })
}

fn check_arity(function: &str, args: usize, min: usize, max: usize) -> Result<(), XPathError> {
    if args < min || args > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(XPathError::FunctionError {
            function: function.to_string(),
            message: format!("Expected {} argument(s), got {}", expected, args),
        });
    }
    Ok(())
}

/// Dispatches a function call to its implementation.
pub fn evaluate_function<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> FnResult<N> {
    match name {
        // Node-set
        "count" => func_count(args),
        "position" => {
            check_arity(name, args.len(), 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_position as f64))
        }
        "last" => {
            check_arity(name, args.len(), 0, 0)?;
            Ok(XPathValue::Number(e_ctx.context_size as f64))
        }
        "local-name" | "name" => func_name(name, args, e_ctx),

        // String
        "string" => {
            check_arity(name, args.len(), 0, 1)?;
            Ok(XPathValue::String(string_arg_or_context(args, e_ctx)))
        }
        "concat" => {
            if args.len() < 2 {
                return arity_error(name, "at least 2");
            }
            Ok(XPathValue::String(args.iter().map(|a| a.to_string()).collect()))
        }
        "normalize-space" => {
            check_arity(name, args.len(), 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::String(s.split_whitespace().collect::<Vec<_>>().join(" ")))
        }
        "string-length" => {
            check_arity(name, args.len(), 0, 1)?;
            let s = string_arg_or_context(args, e_ctx);
            Ok(XPathValue::Number(s.chars().count() as f64))
        }
        "contains" => two_strings(name, args, |a, b| XPathValue::Boolean(a.contains(b))),
        "starts-with" => two_strings(name, args, |a, b| XPathValue::Boolean(a.starts_with(b))),
        "substring-before" => two_strings(name, args, |a, b| {
            XPathValue::String(a.find(b).map(|i| a[..i].to_string()).unwrap_or_default())
        }),
        "substring-after" => two_strings(name, args, |a, b| {
            XPathValue::String(
                a.find(b)
                    .map(|i| a[i + b.len()..].to_string())
                    .unwrap_or_default(),
            )
        }),
        "substring" => func_substring(args),

        // Boolean
        "not" => {
            check_arity(name, args.len(), 1, 1)?;
            Ok(XPathValue::Boolean(!args[0].to_bool()))
        }
        "true" => {
            check_arity(name, args.len(), 0, 0)?;
            Ok(XPathValue::Boolean(true))
        }
        "false" => {
            check_arity(name, args.len(), 0, 0)?;
            Ok(XPathValue::Boolean(false))
        }

        // Number
        "number" => {
            check_arity(name, args.len(), 0, 1)?;
            let n = match args.into_iter().next() {
                Some(arg) => arg.to_number(),
                None => XPathValue::NodeSet(vec![e_ctx.context_node]).to_number(),
            };
            Ok(XPathValue::Number(n))
        }
        "sum" => func_sum(args),

        _ => Err(XPathError::FunctionError {
            function: name.to_string(),
            message: "Unknown XPath function".to_string(),
        }),
    }
}

fn string_arg_or_context<'a, N: DataSourceNode<'a>>(
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> String {
    match args.into_iter().next() {
        Some(arg) => arg.to_string(),
        None => e_ctx.context_node.string_value(),
    }
}

fn two_strings<'a, N: DataSourceNode<'a>>(
    name: &str,
    args: Vec<XPathValue<N>>,
    f: impl Fn(&str, &str) -> XPathValue<N>,
) -> FnResult<N> {
    check_arity(name, args.len(), 2, 2)?;
    Ok(f(&args[0].to_string(), &args[1].to_string()))
}

fn func_count<'a, N: DataSourceNode<'a>>(args: Vec<XPathValue<N>>) -> FnResult<N> {
    check_arity("count", args.len(), 1, 1)?;
    match &args[0] {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(nodes.len() as f64)),
        _ => Err(XPathError::TypeError("count() requires a node-set".to_string())),
    }
}

fn func_sum<'a, N: DataSourceNode<'a>>(args: Vec<XPathValue<N>>) -> FnResult<N> {
    check_arity("sum", args.len(), 1, 1)?;
    match &args[0] {
        XPathValue::NodeSet(nodes) => Ok(XPathValue::Number(
            nodes
                .iter()
                .map(|n| XPathValue::<N>::String(n.string_value()).to_number())
                .sum(),
        )),
        _ => Err(XPathError::TypeError("sum() requires a node-set".to_string())),
    }
}

fn func_name<'a, N: DataSourceNode<'a>>(
    function: &str,
    args: Vec<XPathValue<N>>,
    e_ctx: &EvaluationContext<'a, N>,
) -> FnResult<N> {
    check_arity(function, args.len(), 0, 1)?;
    let node = match args.into_iter().next() {
        Some(XPathValue::NodeSet(nodes)) => nodes.first().copied(),
        Some(_) => {
            return Err(XPathError::TypeError(format!(
                "{}() requires a node-set",
                function
            )));
        }
        None => Some(e_ctx.context_node),
    };
    let name = node
        .and_then(|n| n.name().map(|q| (n.prefix(), q.local_part)))
        .map(|(prefix, local)| match (function, prefix) {
            ("name", Some(p)) => format!("{}:{}", p, local),
            _ => local.to_string(),
        })
        .unwrap_or_default();
    Ok(XPathValue::String(name))
}

/// `substring(s, start, len?)` with XPath's 1-based, rounded positions.
fn func_substring<'a, N: DataSourceNode<'a>>(args: Vec<XPathValue<N>>) -> FnResult<N> {
    check_arity("substring", args.len(), 2, 3)?;
    let s = args[0].to_string();
    let start = args[1].to_number().round();
    let end = match args.get(2) {
        Some(len) => start + len.to_number().round(),
        None => f64::INFINITY,
    };
    let result = s
        .chars()
        .enumerate()
        .filter(|(i, _)| {
            let pos = (*i + 1) as f64;
            pos >= start && pos < end
        })
        .map(|(_, c)| c)
        .collect();
    Ok(XPathValue::String(result))
}
