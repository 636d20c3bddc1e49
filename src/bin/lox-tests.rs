use std::fs;
use std::io;
use std::path::Path;

use rlox::runtime_io::BufferIo;
use rlox::{InterpretResult, Vm};
use std::time::Instant;

fn main() -> io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let filter = args.first().map(|s| s.as_str());
    let dir = Path::new("tests/programs");
    if !dir.exists() {
        eprintln!("tests/programs not found.");
        return Ok(());
    }
    let mut entries = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map(|e| e == "lox").unwrap_or(false))
        .collect::<Vec<_>>();
    entries.sort();

    let mut counts = [0usize; 3];
    for path in entries {
        if let Some(f) = filter
            && !path.to_string_lossy().contains(f)
        {
            continue;
        }
        let path_str = path.to_string_lossy().to_string();
        println!("==== [{}] ====", path_str);
        let src = fs::read_to_string(&path)?;

        let mut vm = Vm::new();
        let mut io = BufferIo::new();
        let t0 = Instant::now();
        let result = vm.interpret_with_io(&src, &mut io);
        let elapsed = t0.elapsed();

        print!("{}", io.get_output());
        if !io.get_errors().is_empty() {
            eprint!("{}", io.get_errors());
        }
        let slot = match result {
            InterpretResult::Ok => 0,
            InterpretResult::CompileError => 1,
            InterpretResult::RuntimeError => 2,
        };
        counts[slot] += 1;
        println!("[{:?}] {:.3} ms", result, elapsed.as_secs_f64() * 1000.0);
        println!();
    }

    println!(
        "ok={}, compile errors={}, runtime errors={}",
        counts[0], counts[1], counts[2]
    );
    Ok(())
}
