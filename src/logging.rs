/// Logger setup for the headless runner.
///
/// The library only talks to the `log` facade; this is the one place a
/// backend is installed.
///
/// ## What lands where
/// ┌───────────┬──────────────────────────────────────────────────┐
/// │ Level      │ Emitted for                                       │
/// ├───────────┼──────────────────────────────────────────────────┤
/// │ warn       │ degraded level data, unreadable config            │
/// │ info       │ level load, stomps, hurts, deaths, completion     │
/// │ debug      │ patrol reversals, spawns, timer start, tick dumps │
/// └───────────┴──────────────────────────────────────────────────┘
///
/// `--verbose` only opens debug for this crate, so dependencies stay at
/// info. An explicit `RUST_LOG` overrides both.

use env_logger::{Builder, Env};

fn default_filter(verbose: bool) -> &'static str {
    if verbose { "info,lenny=debug" } else { "info" }
}

pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    // A second init (tests, embedding hosts) keeps the first logger.
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_opens_debug_for_this_crate_only() {
        assert_eq!(default_filter(false), "info");
        assert_eq!(default_filter(true), "info,lenny=debug");
    }

    #[test]
    fn repeated_init_is_harmless() {
        init(false);
        init(true);
        log::info!("still logging");
    }
}
