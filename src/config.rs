use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Returns the value of the named environment variable if it exists or panics.
pub fn get_variable(name: &str) -> String {
    env::var(name).unwrap_or_else(|_| panic!("must define {} environment variable", name))
}

/// Parses the named environment variable, falling back to `default` if
/// it’s not defined. Panics if it’s defined but can’t be parsed.
pub fn get_parsed_or<T: FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .unwrap_or_else(|_| panic!("parse {} from {:?}", name, value)),
        Err(_) => default,
    }
}

/// Locates the interpreter for the renderer script, preferring the
/// configured path.
#[cfg(feature = "which")]
pub fn get_interpreter(env: Option<String>) -> Option<PathBuf> {
    use which::which;

    env.map(PathBuf::from).or_else(|| which("python3").ok())
}

#[cfg(not(feature = "which"))]
pub fn get_interpreter(env: Option<String>) -> Option<PathBuf> {
    env.map(PathBuf::from)
}
