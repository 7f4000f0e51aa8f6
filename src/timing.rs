use std::fmt;
use std::time::{Duration, Instant};

#[derive(Clone, Debug)]
pub struct Phase {
    pub name: String,
    pub elapsed: Duration,
}

#[derive(Default, Debug)]
pub struct PhaseTimer {
    phases: Vec<Phase>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f`, recording how long it took under `name`.
    pub fn time<T>(&mut self, name: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let value = f();
        let elapsed = start.elapsed();

        log::info!("{}: {:.3} ms", name, millis(elapsed));

        self.phases.push(Phase {
            name: name.to_owned(),
            elapsed,
        });
        value
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn total(&self) -> Duration {
        self.phases.iter().map(|phase| phase.elapsed).sum()
    }

    pub fn get(&self, name: &str) -> Option<Duration> {
        self.phases
            .iter()
            .find(|phase| phase.name == name)
            .map(|phase| phase.elapsed)
    }
}

impl fmt::Display for PhaseTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .phases
            .iter()
            .map(|phase| phase.name.len())
            .max()
            .unwrap_or(0)
            .max("total".len());

        for phase in &self.phases {
            writeln!(
                f,
                "{:<width$}  {:>10.3} ms",
                phase.name,
                millis(phase.elapsed),
                width = width
            )?;
        }
        write!(
            f,
            "{:<width$}  {:>10.3} ms",
            "total",
            millis(self.total()),
            width = width
        )
    }
}

pub fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
