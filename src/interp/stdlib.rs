//! Built-in namespaces available to `wrangle`

use super::console::Console;
use super::value::{Module, NULL, RuntimeError, Value};

type ModuleLoader = fn() -> Module;

/// Every namespace `wrangle` can load by name
const REGISTRY: &[(&str, ModuleLoader)] = &[("io", io_module)];

/// Load the namespace called `name`. Unknown names produce an empty module.
pub fn load_module(name: &str) -> Module {
    match REGISTRY.iter().find(|(n, _)| *n == name) {
        Some((_, load)) => load(),
        None => {
            tracing::debug!("Unknown module `{}`, loading it empty", name);
            Module::new(name)
        }
    }
}

fn io_module() -> Module {
    let mut module = Module::new("io");
    module.builtin("preach", preach);
    module.builtin("input", input);
    module
}

fn io_error(err: std::io::Error) -> RuntimeError {
    RuntimeError::new(format!("io error: {}", err))
}

/// `io.preach(a, b, ...)`: print each argument on its own line
fn preach(console: &mut dyn Console, args: Vec<Value>) -> Result<Value, RuntimeError> {
    for arg in &args {
        console.write_str(&format!("{}\n", arg)).map_err(io_error)?;
    }
    console.flush().map_err(io_error)?;
    Ok(NULL)
}

/// `io.input(prompt?)`: read one line from standard input
fn input(console: &mut dyn Console, args: Vec<Value>) -> Result<Value, RuntimeError> {
    if let Some(prompt) = args.first() {
        console.write_str(&prompt.to_string()).map_err(io_error)?;
        console.flush().map_err(io_error)?;
    }

    let line = console.read_line().map_err(io_error)?.unwrap_or_default();
    let line = line.strip_suffix('\n').unwrap_or(&line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    Ok(Value::String(line.to_string()))
}
