//! Headless simulator runs: autopilot or scripted actions, one tick per step.

use anyhow::{Context, Result};
use med_control::{
    step_session, ActionSource, GuidelineDkaProtocol, GuidelineSepsisProtocol, NoActions,
    ScriptedActions, Treatment,
};
use med_core::{
    format_elapsed, AppStore, ChartHistory, Dka, DkaState, Scheduler, Sepsis, SepsisState,
    Simulator, WallScheduler, TICK_PERIOD,
};
use std::path::Path;

/// How a simulator renders itself in run output.
pub trait SessionReport: Treatment {
    const TITLE: &'static str;

    fn status_line(state: &Self::State) -> String;
    fn summary(sim: &Simulator<Self>, store: &AppStore) -> String;
    fn autopilot() -> Box<dyn ActionSource<Self>>;
    fn scripted(script: &str) -> Result<Box<dyn ActionSource<Self>>>;
    fn time_elapsed(state: &Self::State) -> u32;
}

impl SessionReport for Sepsis {
    const TITLE: &'static str = "Sepsis simulator";

    fn status_line(state: &SepsisState) -> String {
        format!(
            "[t={time}]  map={map:3}  lactate={lactate:.1}  urine={urine:4}  \
             fluid={fluid:4}  abx={abx}  pressor={pressor}",
            time = format_elapsed(state.time_elapsed),
            map = state.map,
            lactate = state.lactate,
            urine = state.urine_output,
            fluid = state.fluid_given,
            abx = state.antibiotics_given,
            pressor = state.vasopressor_used,
        )
    }

    fn summary(sim: &Simulator<Self>, store: &AppStore) -> String {
        match sim.outcome(store) {
            Some(outcome) => format!("Outcome: {outcome:?}. {}", outcome.message()),
            None => "Outcome: still in progress.".to_string(),
        }
    }

    fn autopilot() -> Box<dyn ActionSource<Self>> {
        Box::new(GuidelineSepsisProtocol)
    }

    fn scripted(script: &str) -> Result<Box<dyn ActionSource<Self>>> {
        let actions = ScriptedActions::<med_core::SepsisAction>::parse(script)
            .context("parsing --script")?;
        Ok(Box::new(actions))
    }

    fn time_elapsed(state: &SepsisState) -> u32 {
        state.time_elapsed
    }
}

impl SessionReport for Dka {
    const TITLE: &'static str = "DKA simulator";

    fn status_line(state: &DkaState) -> String {
        format!(
            "[t={time}]  glucose={glucose:3}  K={k:.1}  pH={ph:.2}  gap={gap:2}  \
             fluid={fluid:4}  insulin={insulin:.1}",
            time = format_elapsed(state.time_elapsed),
            glucose = state.glucose,
            k = state.potassium,
            ph = state.ph,
            gap = state.anion_gap,
            fluid = state.fluid_given,
            insulin = state.insulin_rate,
        )
    }

    fn summary(sim: &Simulator<Self>, store: &AppStore) -> String {
        let sq = if store.dka().transitioned_to_sq {
            "  transitioned to SQ insulin"
        } else {
            ""
        };
        format!("Phase: {}.{sq}", sim.phase().label())
    }

    fn autopilot() -> Box<dyn ActionSource<Self>> {
        Box::new(GuidelineDkaProtocol::default())
    }

    fn scripted(script: &str) -> Result<Box<dyn ActionSource<Self>>> {
        let actions =
            ScriptedActions::<med_core::DkaAction>::parse(script).context("parsing --script")?;
        Ok(Box::new(actions))
    }

    fn time_elapsed(state: &DkaState) -> u32 {
        state.time_elapsed
    }
}

pub struct RunOptions<'a> {
    pub ticks: u64,
    pub autopilot: bool,
    pub script: Option<&'a str>,
    pub print_every: u64,
    pub chart_csv: Option<&'a Path>,
    pub realtime: bool,
    pub fresh: bool,
}

pub fn run_session<M: SessionReport>(store: &mut AppStore, opts: &RunOptions<'_>) -> Result<()> {
    let mut source: Box<dyn ActionSource<M>> = match (opts.autopilot, opts.script) {
        (true, _) => M::autopilot(),
        (false, Some(script)) => M::scripted(script)?,
        (false, None) => Box::new(NoActions),
    };

    let mut sim = Simulator::<M>::new();
    if opts.fresh {
        sim.reset(store);
    }
    let print_every = opts.print_every.max(1);

    println!(
        "{}: ticks={} start t={} driver={}",
        M::TITLE,
        opts.ticks,
        format_elapsed(M::time_elapsed(M::state(store))),
        driver_name(opts),
    );
    println!("{}", "-".repeat(80));

    sim.start();
    let mut wall = opts.realtime.then(|| WallScheduler::new(TICK_PERIOD));
    let mut delivered = 0u64;
    let mut printed = 0usize;
    while delivered < opts.ticks {
        let due = match wall.as_mut() {
            Some(scheduler) => {
                std::thread::sleep(scheduler.until_next());
                scheduler.due_ticks()
            }
            None => 1,
        };
        for _ in 0..due.min(opts.ticks - delivered) {
            if !step_session(&mut sim, store, source.as_mut()) {
                break;
            }
            delivered += 1;

            // Feedback prints as it appears, regardless of print_every.
            for entry in &sim.feedback().entries()[printed..] {
                println!("  >> {entry}");
            }
            printed = sim.feedback().len();

            if delivered % print_every == 0 {
                println!("{}", M::status_line(M::state(store)));
            }
        }
    }
    sim.dispose();
    tracing::debug!(simulator = M::NAME, delivered, "session finished");

    println!("{}", "-".repeat(80));
    println!("Done after {delivered} ticks:");
    println!("{}", M::status_line(M::state(store)));
    println!("{}", M::summary(&sim, store));

    if let Some(path) = opts.chart_csv {
        write_chart_csv(sim.chart(), path)?;
        println!("Chart history written to {}", path.display());
    }
    Ok(())
}

fn driver_name(opts: &RunOptions<'_>) -> &'static str {
    if opts.autopilot {
        "autopilot"
    } else if opts.script.is_some() {
        "script"
    } else {
        "none"
    }
}

/// One row per chart point: `tick` then one column per charted variable.
pub fn write_chart_csv(chart: &ChartHistory, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create chart file {}", path.display()))?;
    let names = chart.variable_names();
    let mut header = vec!["tick".to_string()];
    header.extend(names.iter().cloned());
    writer.write_record(&header)?;
    for point in chart.points() {
        let mut row = vec![point.tick.to_string()];
        row.extend(
            names
                .iter()
                .map(|name| point.value(name).map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use med_core::ChartPoint;

    #[test]
    fn chart_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        let mut chart = ChartHistory::new();
        chart.push(ChartPoint::new(1, &[("map", 57.0), ("lactate", 4.0)]));
        chart.push(ChartPoint::new(2, &[("map", 59.0), ("lactate", 3.8)]));
        write_chart_csv(&chart, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines, vec!["tick,lactate,map", "1,4,57", "2,3.8,59"]);
    }

    #[test]
    fn autopilot_session_persists_final_state() {
        let mut store = AppStore::in_memory();
        let opts = RunOptions {
            ticks: 15,
            autopilot: true,
            script: None,
            print_every: 5,
            chart_csv: None,
            realtime: false,
            fresh: true,
        };
        run_session::<Sepsis>(&mut store, &opts).unwrap();
        assert_eq!(store.sepsis().time_elapsed, 15);
        assert!(store.sepsis().antibiotics_given);
        assert!(store.sepsis().fluid_given >= 2000);
    }

    #[test]
    fn bad_script_is_an_error() {
        let mut store = AppStore::in_memory();
        let opts = RunOptions {
            ticks: 1,
            autopilot: false,
            script: Some("0:vasopressor"),
            print_every: 1,
            chart_csv: None,
            realtime: false,
            fresh: false,
        };
        let err = run_session::<Dka>(&mut store, &opts).unwrap_err();
        assert!(format!("{err:#}").contains("vasopressor"));
    }
}
