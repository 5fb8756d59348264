use std::env;
use std::process;

use log::{error, info};
#[macro_use]
extern crate text_io;

use wordboggle::{BoardSolver, Grid, PrefixDictionary, Result, SolverConfig};

/// Takes rows until the first empty line. A row of blank cells is still a row
fn puzzle_rows<I: IntoIterator<Item = String>>(lines: I) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| line.trim_end_matches('\r').to_string())
        .take_while(|line| !line.is_empty())
        .collect()
}

/// Reads puzzle rows from stdin until an empty line or EOF
fn read_puzzle() -> Result<Grid> {
    println!("Enter puzzle rows, empty line to finish:");
    let lines = std::iter::from_fn(|| -> Option<String> { try_read!("{}\n").ok() });
    Grid::from_lines(&puzzle_rows(lines))
}

fn run() -> Result<()> {
    let mut args = env::args().skip(1);
    let words_path = args.next().unwrap_or_else(|| "words.txt".to_string());
    let config = match args.next() {
        Some(path) => SolverConfig::from_file(path)?,
        None => SolverConfig::default(),
    };

    let dict = PrefixDictionary::load_with_cache(&words_path, config.min_word_length)?;
    info!("Number of Words: {}", dict.len());

    let grid = read_puzzle()?;
    let solver = BoardSolver::with_config(grid, &dict, config);

    println!("Words: {:?}", solver.solve_par());
    for (i, found) in solver.solve_rounds()?.iter().enumerate() {
        println!("Round {}: {} {:?}", i + 1, found.word, found.path);
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{}", e);
        process::exit(1);
    }
}
