use rlox::runtime_io::BufferIo;
use rlox::{InterpretResult, Vm};
use std::fs;
use std::path::PathBuf;

/// End-to-end tests: every .lox file under tests/programs/ is compiled and
/// run on a fresh VM, capturing output and diagnostics.

fn get_test_programs() -> Vec<PathBuf> {
    let test_dir = PathBuf::from("tests/programs");
    if !test_dir.exists() {
        return vec![];
    }

    let mut programs = vec![];
    if let Ok(entries) = fs::read_dir(&test_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("lox") {
                programs.push(path);
            }
        }
    }
    programs.sort();
    programs
}

struct Outcome {
    result: InterpretResult,
    output: String,
    errors: String,
}

fn run_test_program(path: &PathBuf) -> Result<Outcome, String> {
    let source = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let mut vm = Vm::new();
    let mut io = BufferIo::new();
    let result = vm.interpret_with_io(&source, &mut io);
    let errors = io.drain_errors();
    Ok(Outcome {
        result,
        output: io.take_output(),
        errors,
    })
}

#[test]
fn test_e2e_all_programs_terminate_cleanly() {
    let programs = get_test_programs();

    if programs.is_empty() {
        println!("Warning: No test programs found in tests/programs/");
        return;
    }

    let mut failed = 0;
    for path in programs {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        match run_test_program(&path) {
            // a failing program must say why
            Ok(outcome) if outcome.result != InterpretResult::Ok && outcome.errors.is_empty() => {
                println!("{}: {:?} without diagnostics", name, outcome.result);
                failed += 1;
            }
            Ok(outcome) => println!("{}: {:?}", name, outcome.result),
            Err(err) => {
                println!("{}: could not run: {}", name, err);
                failed += 1;
            }
        }
    }

    assert_eq!(failed, 0, "Some E2E programs failed");
}

macro_rules! test_program {
    ($test_name:ident, $filename:literal, output = $expected:expr) => {
        #[test]
        fn $test_name() {
            let _ = include_str!(concat!("programs/", $filename));

            let path = PathBuf::from(concat!("tests/programs/", $filename));
            let outcome = run_test_program(&path).unwrap();
            assert_eq!(
                outcome.result,
                InterpretResult::Ok,
                "{} should execute successfully:\n{}",
                $filename,
                outcome.errors
            );
            assert_eq!(outcome.output, $expected, "{}: unexpected output", $filename);
        }
    };

    ($test_name:ident, $filename:literal, result = $result:ident, output = $expected:expr, errors = [$($error:literal),*]) => {
        #[test]
        fn $test_name() {
            let _ = include_str!(concat!("programs/", $filename));

            let path = PathBuf::from(concat!("tests/programs/", $filename));
            let outcome = run_test_program(&path).unwrap();
            assert_eq!(outcome.result, InterpretResult::$result, "{}", $filename);
            assert_eq!(outcome.output, $expected, "{}: unexpected output", $filename);
            $(
                assert!(
                    outcome.errors.contains($error),
                    "{}: errors should contain '{}'\nActual errors:\n{}",
                    $filename,
                    $error,
                    outcome.errors
                );
            )*
        }
    };
}

test_program!(
    test_arith,
    "arith.lox",
    output = "7\n9\n2.5\n2\n3\n26\n0.3333333333333333\n0.30000000000000004\n"
);
test_program!(
    test_comparison,
    "comparison.lox",
    output = "true\ntrue\nfalse\nfalse\ntrue\nfalse\ntrue\ntrue\ntrue\nfalse\ntrue\nfalse\nfalse\nfalse\n"
);
test_program!(
    test_strings,
    "strings.lox",
    output = "hello, world!\ntrue\nx\nmulti\nline\n"
);
test_program!(
    test_globals,
    "globals.lox",
    output = "nil\n2\n10\n10\nredefined\n"
);
test_program!(
    test_scopes,
    "scopes.lox",
    output = "inner a\nglobal b\nouter a\nouter a!!\nglobal a\n"
);
test_program!(test_comments, "comments.lox", output = "1\n3\n");
test_program!(
    test_compile_errors,
    "compile_errors.lox",
    result = CompileError,
    output = "",
    errors = [
        "[line 1] Error at ';': Expect expression.",
        "[line 2] Error at '=': Expect variable name.",
        "[line 4] Error at 'x': Can't read local variable in its own initializer.",
        "[line 5] Error at '=': Invalid assignment target."
    ]
);
test_program!(
    test_unterminated_string,
    "unterminated.lox",
    result = CompileError,
    output = "",
    errors = ["[line 2] Error: Unterminated string."]
);
test_program!(
    test_runtime_error,
    "runtime_error.lox",
    result = RuntimeError,
    output = "before\n",
    errors = ["Operands must be two numbers or two strings.", "[line 3] in script"]
);
test_program!(
    test_undefined_variable,
    "undefined.lox",
    result = RuntimeError,
    output = "1\n",
    errors = ["Undefined variable 'notDefined'.", "[line 3] in script"]
);

#[test]
fn test_compile_errors_are_reported_once_each() {
    let outcome = run_test_program(&PathBuf::from("tests/programs/compile_errors.lox")).unwrap();
    assert_eq!(outcome.errors.lines().count(), 4, "{}", outcome.errors);
}
