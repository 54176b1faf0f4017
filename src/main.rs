//! timereaper main entrypoint.

use timereaper::run;
use timereaper::ui::messages::report;

fn main() {
    if let Err(e) = run() {
        report(&e);
        std::process::exit(1);
    }
}
