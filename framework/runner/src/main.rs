use trafic_runner::prelude::{init, run};

fn main() -> anyhow::Result<()> {
    run(init())
}
