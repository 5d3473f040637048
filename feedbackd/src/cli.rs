//! Manual flag parsing for the daemon binary — no framework, matching the
//! teacher's own `--verbose`/`-v` style argument scanning (§4.9).

pub struct Cli {
    pub verbose: bool,
    pub replace: bool,
}

pub enum ParsedArgs {
    Run(Cli),
    PrintVersionAndExit,
    UnrecognizedFlag(String),
}

pub fn parse(args: &[String]) -> ParsedArgs {
    let mut verbose = false;
    let mut replace = false;

    for arg in args {
        match arg.as_str() {
            "--verbose" | "-v" => verbose = true,
            "--replace" | "-r" => replace = true,
            "--version" => return ParsedArgs::PrintVersionAndExit,
            other => return ParsedArgs::UnrecognizedFlag(other.to_string()),
        }
    }

    ParsedArgs::Run(Cli { verbose, replace })
}
