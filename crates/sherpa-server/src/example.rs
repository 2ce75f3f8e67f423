//! Example API served by the `sherpa-example` binary.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sherpa_core::{
    Api, ApiBuilder, Error, FieldDoc, FunctionDoc, Int64s, Param, Section, TypeDoc,
};

/// Summary returned by `stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub count: usize,
    pub mean: f64,
}

async fn sum(a: i64, b: i64) -> i64 {
    a + b
}

async fn echo(value: Value) -> Value {
    value
}

async fn concat(separator: String, parts: Vec<String>) -> String {
    parts.join(&separator)
}

async fn divide(a: f64, b: f64) -> Result<f64, Error> {
    if b == 0.0 {
        return Err(Error::new("divisionByZero", "cannot divide by zero"));
    }
    Ok(a / b)
}

async fn int64_test(a: Int64s, b: Option<Int64s>) -> (Int64s, Option<Int64s>) {
    (a, b)
}

/// Minimum, maximum and summary of a list; fails on an empty list.
async fn stats(values: Vec<f64>) -> Result<(f64, f64, Stats), String> {
    if values.is_empty() {
        return Err("no values".to_string());
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    Ok((
        min,
        max,
        Stats {
            count: values.len(),
            mean,
        },
    ))
}

fn param(name: &str, ty: &str) -> Param {
    Param {
        name: name.to_string(),
        ty: ty.split_whitespace().map(String::from).collect(),
    }
}

fn function_doc(name: &str, text: &str, params: Vec<Param>, returns: Vec<Param>) -> FunctionDoc {
    FunctionDoc {
        name: name.to_string(),
        text: text.to_string(),
        params,
        returns,
    }
}

fn docs() -> Section {
    Section {
        title: "Example API".into(),
        text: "Functions demonstrating how parameters and results travel over Sherpa.".into(),
        functions: vec![
            function_doc(
                "echo",
                "echo(value any) any\n\nReturns its parameter unchanged.",
                vec![param("value", "any")],
                vec![param("r", "any")],
            ),
            function_doc(
                "int64Test",
                "int64Test(a int64s, b nullable int64s) (int64s, nullable int64s)\n\n\
                 Returns its parameters. Both may be sent quoted or unquoted and are always \
                 returned as strings.",
                vec![param("a", "int64s"), param("b", "nullable int64s")],
                vec![param("r0", "int64s"), param("r1", "nullable int64s")],
            ),
        ],
        sections: vec![
            Section {
                title: "Math".into(),
                text: "Arithmetic.".into(),
                functions: vec![
                    function_doc(
                        "sum",
                        "sum(a int64, b int64) int64\n\nReturns a + b.",
                        vec![param("a", "int64"), param("b", "int64")],
                        vec![param("r", "int64")],
                    ),
                    function_doc(
                        "divide",
                        "divide(a float64, b float64) float64\n\n\
                         Returns a / b. Fails with code `divisionByZero` when b is 0.",
                        vec![param("a", "float64"), param("b", "float64")],
                        vec![param("r", "float64")],
                    ),
                    function_doc(
                        "stats",
                        "stats(values []float64) (float64, float64, Stats)\n\n\
                         Returns minimum, maximum and a summary. Fails on an empty list.",
                        vec![param("values", "[] float64")],
                        vec![
                            param("min", "float64"),
                            param("max", "float64"),
                            param("summary", "Stats"),
                        ],
                    ),
                ],
                types: vec![TypeDoc {
                    name: "Stats".into(),
                    text: "Summary of a list of values.".into(),
                    fields: vec![
                        FieldDoc {
                            name: "count".into(),
                            ty: vec!["int64".into()],
                            text: "Number of values.".into(),
                        },
                        FieldDoc {
                            name: "mean".into(),
                            ty: vec!["float64".into()],
                            text: "Arithmetic mean.".into(),
                        },
                    ],
                }],
                ..Default::default()
            },
            Section {
                title: "Strings".into(),
                text: String::new(),
                functions: vec![function_doc(
                    "concat",
                    "concat(separator string, ...parts string) string\n\n\
                     Joins parts with separator. Parts are passed as one array and may be left out.",
                    vec![param("separator", "string"), param("parts", "[] string")],
                    vec![param("r", "string")],
                )],
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

/// Build the example API served from `base_url`.
pub fn example_api(base_url: &str) -> sherpa_core::Result<Api> {
    ApiBuilder::new(base_url, "example", "Example API", env!("CARGO_PKG_VERSION"))
        .function("sum", sum)
        .function("echo", echo)
        .variadic("concat", concat)
        .fallible("divide", divide)
        .function("int64Test", int64_test)
        .fallible("stats", stats)
        .docs(docs())
        .build()
}
