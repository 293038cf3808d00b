//! Step progress display for the generation pipeline.

use indicatif::{ProgressBar, ProgressStyle};

use crate::plan::TaskKey;
use crate::Result;

fn task_label(task: TaskKey) -> &'static str {
    match task {
        TaskKey::GeneratePlan => "Resolve plan",
        TaskKey::GenerateVerilog => "Generate Verilog",
        TaskKey::GenerateLibrelane => "Generate LibreLane config",
        TaskKey::GenerateTestbench => "Generate testbench",
        TaskKey::GenerateDocs => "Generate documentation",
    }
}

pub struct StepContext {
    bar: ProgressBar,
}

impl StepContext {
    pub fn new(total_steps: usize) -> Self {
        let bar = ProgressBar::new(total_steps as u64);
        bar.set_style(
            ProgressStyle::with_template("[{pos}/{len}] {msg}")
                .expect("static template must parse"),
        );
        StepContext { bar }
    }

    pub fn finish(&mut self, task: TaskKey) {
        self.bar.println(format!("done: {}", task_label(task)));
        self.bar.inc(1);
    }

    /// Pass a result through, abandoning the progress display on failure so
    /// the error is not drawn over.
    pub fn check<T>(&mut self, res: Result<T>) -> Result<T> {
        if res.is_err() {
            self.bar.abandon();
        }
        res
    }

    pub fn done(self) {
        self.bar.finish_and_clear();
    }
}
