use crate::api::ApiServer;
use crate::config::Config;
use crate::global;
use crate::indicator::{
    CpalPlayback, FileIconSetter, FileVisualIndicator, IndicatorCoordinator, VisualIndicator,
    WavAudioIndicator,
};
use crate::state::{State, StateMachine};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Span};

pub async fn run_service(config: Config) -> Result<()> {
    info!("Starting Vox service");

    let service_span = info_span!("vox");
    let machine = build_feedback(&config, &service_span).await?;

    let shutdown = CancellationToken::new();
    let api_server = ApiServer::new(machine.clone(), &config);
    let mut server_task = tokio::spawn(api_server.start(shutdown.clone()));

    info!("Vox is ready!");
    info!("Bind your hotkey to one of:");
    info!("  vox toggle");
    info!(
        "  curl -X POST http://127.0.0.1:{}/toggle",
        config.api.port
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for shutdown signal")?;
            info!("Shutdown signal received");
            shutdown.cancel();
            match server_task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("API server failed during shutdown: {}", e),
                Err(e) => error!("API server task failed: {}", e),
            }
        }
        result = &mut server_task => {
            match result {
                Ok(Ok(())) => warn!("API server exited unexpectedly"),
                Ok(Err(e)) => return Err(e.context("API server failed")),
                Err(e) => return Err(anyhow::Error::new(e).context("API server task failed")),
            }
        }
    }

    info!("Vox stopped in state {}", machine.state());
    Ok(())
}

/// Build the state machine and both indicators from config, and subscribe
/// the indicator coordinator to it.
///
/// Each component logs under its own child of `parent`. A visual indicator
/// that cannot load its icons is fatal. Audio is best-effort: a missing
/// output device only disables sounds.
pub async fn build_feedback(config: &Config, parent: &Span) -> Result<Arc<StateMachine>> {
    let assets = global::assets_dir(config.assets.dir.as_deref());
    let machine =
        Arc::new(StateMachine::new().with_span(info_span!(parent: parent, "state_machine")));
    let coordinator = Arc::new(
        IndicatorCoordinator::new().with_span(info_span!(parent: parent, "indicator_coordinator")),
    );

    if config.visual.enabled {
        let setter = FileIconSetter::new(config.icon_output_path()?);
        info!("Publishing tray icon to {:?}", setter.path());
        let visual = build_visual(Arc::new(setter), &assets, parent)?;

        if let Err(e) = visual.update_icon(State::Idle).await {
            warn!("Failed to set initial icon: {:#}", anyhow::Error::from(e));
        }
        coordinator.set_visual(Some(visual as Arc<dyn VisualIndicator>));
        info!("Visual indicator initialized");
    }

    if config.audio.enabled {
        match CpalPlayback::new(config.audio.output_channels, config.audio.volume) {
            Ok(sink) => {
                let audio = WavAudioIndicator::new(Arc::new(sink), assets.join("sounds"))
                    .with_span(info_span!(parent: parent, "audio_indicator"));
                coordinator.set_audio(Some(Arc::new(audio)));
                info!("Audio indicator initialized");
            }
            Err(e) => warn!("Audio feedback disabled: {:#}", e),
        }
    }

    machine.subscribe(coordinator);
    info!("Indicator coordinator subscribed to state changes");

    Ok(machine)
}

fn build_visual(
    setter: Arc<FileIconSetter>,
    assets: &Path,
    parent: &Span,
) -> Result<Arc<FileVisualIndicator>> {
    let visual = FileVisualIndicator::new(setter, assets.join("icons"))
        .context("Failed to initialize visual indicator")?
        .with_span(info_span!(parent: parent, "visual_indicator"));
    Ok(Arc::new(visual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicator::icon_file_name;
    use std::sync::Mutex;
    use tracing_subscriber::layer::{Context as LayerContext, SubscriberExt};
    use tracing_subscriber::registry::LookupSpan;
    use tracing_subscriber::Layer;

    /// Records the span scope (innermost first) of every event.
    #[derive(Clone, Default)]
    struct SpanCapture {
        scopes: Arc<Mutex<Vec<Vec<&'static str>>>>,
    }

    impl<S> Layer<S> for SpanCapture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_event(&self, event: &tracing::Event<'_>, ctx: LayerContext<'_, S>) {
            if let Some(span) = ctx.event_span(event) {
                let scope = span.scope().map(|s| s.name()).collect();
                self.scopes.lock().unwrap().push(scope);
            }
        }
    }

    fn write_icons(dir: &Path) {
        let icons = dir.join("icons");
        std::fs::create_dir(&icons).unwrap();
        for state in State::ALL {
            std::fs::write(icons.join(icon_file_name(state)), state.as_str()).unwrap();
        }
    }

    fn config_for(assets: &Path, icon_output: &Path) -> Config {
        let mut config = Config::default();
        config.assets.dir = Some(assets.to_string_lossy().into_owned());
        config.visual.icon_output = Some(icon_output.to_string_lossy().into_owned());
        config.audio.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_missing_icons_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path(), &dir.path().join("tray.png"));

        assert!(build_feedback(&config, &Span::none()).await.is_err());
    }

    #[tokio::test]
    async fn test_icon_follows_transitions() {
        let dir = tempfile::tempdir().unwrap();
        write_icons(dir.path());
        let output = dir.path().join("out").join("tray.png");
        let config = config_for(dir.path(), &output);

        let machine = build_feedback(&config, &Span::none()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "idle");

        machine.transition(State::Recording).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "recording");

        machine.transition(State::Processing).await.unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "processing");
    }

    #[tokio::test]
    async fn test_visual_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_for(dir.path(), &dir.path().join("tray.png"));
        config.visual.enabled = false;

        let machine = build_feedback(&config, &Span::none()).await.unwrap();
        machine.transition(State::Recording).await.unwrap();
        assert!(!dir.path().join("tray.png").exists());
    }

    #[tokio::test]
    async fn test_components_log_under_injected_span() {
        let capture = SpanCapture::default();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(capture.clone()));

        let dir = tempfile::tempdir().unwrap();
        write_icons(dir.path());
        let config = config_for(dir.path(), &dir.path().join("tray.png"));

        let service = info_span!("vox_service");
        let machine = build_feedback(&config, &service).await.unwrap();
        machine.transition(State::Recording).await.unwrap();

        let scopes = capture.scopes.lock().unwrap();
        assert!(scopes.contains(&vec!["state_machine", "vox_service"]), "{scopes:?}");
        assert!(scopes.contains(&vec!["visual_indicator", "vox_service"]), "{scopes:?}");
    }
}
