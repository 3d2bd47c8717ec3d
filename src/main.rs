use clap::Parser;
use wallrun::game::application::GameApplication;
use wallrun::settings::CliArgs;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let config = args.movement_config()?;
    let course = args.course()?;
    let input = Box::new(args.scenario.script(args.tick_rate));

    let mut app = GameApplication::new(config, &course, input, args.tick_rate);
    let stats = app.run(args.seconds)?;

    for (time, transition) in &stats.transitions {
        println!(
            "{:>7.3}s  {:<11} -> {:<11} {:?}",
            time, transition.from, transition.to, transition.reason
        );
    }
    Ok(())
}
