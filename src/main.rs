use clap::Parser;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use ratatui::DefaultTerminal;
use scorebar::{App, AppConfig, AppEvent, Args, ConfigManager, OpenOptions, Theme, APP_NAME};
use std::sync::mpsc::channel;
use std::time::Duration;

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn run(mut terminal: DefaultTerminal, args: &Args, config: AppConfig) -> Result<()> {
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let theme = Theme::from_config(&config.theme)?;

    let (tx, rx) = channel::<AppEvent>();
    let mut app = App::new_with_config(tx.clone(), theme, config);
    if args.debug {
        app.enable_debug();
    }
    render(&mut terminal, &mut app)?;

    if let Some(layout) = &args.layout {
        tx.send(AppEvent::Layout(layout.clone()))?;
    }
    if let Some(path) = &args.path {
        tx.send(AppEvent::Open(path.clone(), OpenOptions::from(args)))?;
    }

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Mouse(mouse) => tx.send(AppEvent::Mouse(mouse))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let mut updated = false;
        loop {
            match rx.try_recv() {
                Ok(AppEvent::Exit) => return Ok(()),
                Ok(AppEvent::Crash(msg)) => return Err(color_eyre::eyre::eyre!(msg)),
                Ok(event) => {
                    if let Some(next) = app.event(&event) {
                        tx.send(next)?;
                    }
                    updated = true;
                }
                Err(std::sync::mpsc::TryRecvError::Empty) => break,
                Err(std::sync::mpsc::TryRecvError::Disconnected) => return Ok(()),
            }
        }

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.generate_config {
        let config_manager = ConfigManager::new(APP_NAME)?;
        let path = config_manager.write_default_config(args.force)?;
        println!("Wrote default configuration to {}", path.display());
        return Ok(Some(()));
    }
    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;
    let mut config = AppConfig::load(APP_NAME)?;
    if args.debug {
        config.debug.enabled = true;
    }
    if let Some(log_file) = args.log_file.as_ref().or(config.debug.log_file.as_ref()) {
        scorebar::logging::init(log_file)?;
    }

    let terminal = ratatui::init();
    execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = run(terminal, &args, config);
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
