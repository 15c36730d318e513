use std::fs;

use anyhow::Result;
use clap::{Arg, Command};
use ripple_core::{register_optimize, Interpreter, Value};

mod repl;

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("ripple")
        .version(ripple_core::VERSION)
        .about("Run Ripple scripts and inspect the @optimize lowering pass")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Execute a Ripple script file")
                .index(1),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Run the built-in lowering demonstration")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("emit-ast")
                .long("emit-ast")
                .help("Print the parsed syntax tree as JSON instead of running")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize logging
    if matches.get_flag("debug") {
        tracing_subscriber::fmt()
            .with_env_filter("ripple_core=debug")
            .init();
    } else {
        ripple_core::init_tracing();
    }

    let mut interp = Interpreter::new();
    register_optimize(&mut interp);

    if matches.get_flag("demo") {
        return run_demo(&mut interp);
    }

    if let Some(file) = matches.get_one::<String>("file") {
        let source = fs::read_to_string(file)?;
        if matches.get_flag("emit-ast") {
            let program = ripple_core::parse(&source)?;
            println!("{}", serde_json::to_string_pretty(&program)?);
            return Ok(());
        }
        let value = interp.run(&source, file)?;
        if !matches!(value, Value::Null) {
            println!("{value}");
        }
        return Ok(());
    }

    repl::run(interp)
}

const DEMO: &str = "\
@optimize
fn test(x)
    x = array(x)
    return x * x + x
endfn

print(test([1, 2, 3]))
";

fn run_demo(interp: &mut Interpreter) -> Result<()> {
    interp.run(DEMO, "<demo>")?;
    if let Some(Value::Function(func)) = interp.get_global("test") {
        println!();
        println!("Lowered definition:");
        print!("{}", func.source());
    }
    Ok(())
}
