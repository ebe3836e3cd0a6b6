//! Interactive wizard session.

use console::style;
use tokio::io::{AsyncBufReadExt, BufReader};

use rainwise::config::Settings;
use rainwise::geocode::GeocodeStatus;
use rainwise::map::{MapMode, MapSurface};
use rainwise::submission::HttpAssessmentGateway;
use rainwise::wizard::WizardState;
use rainwise::{FormField, Notice, WizardSession};

use super::input::{parse_input, Input, HELP};
use crate::cli::icons::{bullet, error, for_level, info, success, warn};
use crate::cli::progress::{step_header, CompletionGauge};

pub async fn cmd_wizard(settings: &Settings, read_only_map: bool) -> anyhow::Result<()> {
    let client = settings.http_client()?;
    let mode = if read_only_map {
        MapMode::ReadOnly
    } else {
        MapMode::Interactive
    };
    let map = MapSurface::new(mode, settings.geolocation(&client), settings.map.clone());
    let gateway = settings.assessment_gateway(&client);
    let (mut session, mut notices) = WizardSession::new(
        settings.geocode_lookup(&client),
        map,
        settings.session_options(),
    );

    let gauge = CompletionGauge::new();
    let mut states = session.subscribe();
    let mut lookups = session.subscribe_geocode();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    gauge.println(format!(
        "{} Type {} for commands.",
        info(),
        style(":help").cyan()
    ));
    show_step(&gauge, &mut session);
    gauge.update(&session.state());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(e) => {
                        gauge.println(format!("{} {}", warn(), e));
                        continue;
                    }
                };
                if !handle_input(input, &mut session, gateway.as_ref(), &gauge).await {
                    break;
                }
            }
            Some(notice) = notices.recv() => show_notice(&gauge, &notice),
            Ok(()) = lookups.changed() => {
                let status = lookups.borrow_and_update().clone();
                tracing::debug!(?status, "geocode status");
                if let GeocodeStatus::Resolving { address } = status {
                    gauge.println(format!("{} Looking up {}", info(), style(address).dim()));
                }
            }
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = states.borrow_and_update().clone();
                gauge.update(&state);
                // background geocoding can move the coordinate
                if let Some(transition) = session.sync_map() {
                    gauge.println(format!(
                        "{} Map centred on {} (zoom {:.0})",
                        info(),
                        transition.to.center,
                        transition.to.zoom
                    ));
                }
            }
        }
    }

    session.close();
    let state = session.state();
    tracing::debug!(
        step = state.step.number(),
        completion = state.completion,
        "wizard session ended"
    );
    while let Ok(notice) = notices.try_recv() {
        show_notice(&gauge, &notice);
    }
    gauge.finish();
    Ok(())
}

/// Returns false when the session should end.
async fn handle_input(
    input: Input,
    session: &mut WizardSession,
    gateway: Option<&HttpAssessmentGateway>,
    gauge: &CompletionGauge,
) -> bool {
    match input {
        Input::Empty => {}
        Input::Help => gauge.println(HELP),
        Input::Quit => return false,
        Input::Set(field, value) => {
            if let Err(e) = session.update(field, &value) {
                gauge.println(format!("{} {}", error(), e));
            }
        }
        Input::Next => {
            if session.next() {
                show_step(gauge, session);
            }
        }
        Input::Prev => {
            if session.previous() {
                show_step(gauge, session);
            }
        }
        Input::Locate => {
            gauge.println(format!("{} Getting location...", info()));
            if let Ok(coordinate) = session.locate().await {
                gauge.println(format!("{} Location set to {}", success(), coordinate));
            }
        }
        Input::Click(point) => {
            if let Ok(coordinate) = session.click_map(point) {
                gauge.println(format!("{} Selected {}", success(), coordinate));
            }
        }
        Input::Drag(point) => {
            if let Ok(coordinate) = session.drag_marker(point) {
                gauge.println(format!("{} Marker moved to {}", success(), coordinate));
            }
        }
        Input::Earth => gauge.println(format!(
            "{} Measure your roof: {}",
            info(),
            style(session.earth_link()).underlined()
        )),
        Input::Review => show_review(gauge, &session.state()),
        Input::Submit => {
            let Some(gateway) = gateway else {
                gauge.println(format!(
                    "{} No assessment endpoint configured (assessment.endpoint or RAINWISE_ASSESSMENT_URL)",
                    error()
                ));
                return true;
            };
            if let Ok(receipt) = session.submit(gateway).await {
                if let Some(url) = receipt.results_url {
                    gauge.println(format!("{} Results: {}", success(), style(url).underlined()));
                }
                return false;
            }
        }
    }
    true
}

fn show_notice(gauge: &CompletionGauge, notice: &Notice) {
    gauge.println(format!(
        "{} {}: {}",
        for_level(notice.level),
        style(&notice.title).bold(),
        notice.description
    ));
}

fn show_step(gauge: &CompletionGauge, session: &mut WizardSession) {
    let state = session.state();
    gauge.println(format!("\n{}", style(step_header(&state)).bold()));
    gauge.println(format!("  {}", style(state.step.description()).dim()));

    for field in state.step.fields() {
        gauge.println(format!(
            "  {} {} ({}) = {}",
            bullet(),
            field.label(),
            field.as_str(),
            state.form.text(*field)
        ));
    }

    if state.step.shows_map() {
        let map = session.map();
        let view = map.view();
        match map.marker() {
            Some(marker) => gauge.println(format!("  {} Marker at {}", bullet(), marker)),
            None => gauge.println(format!(
                "  {} No location yet; map at {} (zoom {:.0})",
                bullet(),
                view.center,
                view.zoom
            )),
        }
        gauge.println(format!("  {}", style(&map.tiles().attribution).dim()));
    }

    if state.step.is_last() {
        show_review(gauge, &state);
    }
}

fn show_review(gauge: &CompletionGauge, state: &WizardState) {
    for field in FormField::ALL {
        let value = state.form.text(field);
        let shown = if value.trim().is_empty() {
            style("-".to_string()).dim()
        } else {
            style(value.to_string())
        };
        gauge.println(format!("  {:<34} {}", field.label(), shown));
    }
    let coordinate = state
        .form
        .coordinate()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    gauge.println(format!("  {:<34} {}", "Selected location", coordinate));

    for issue in state.issues() {
        gauge.println(format!("  {} {}", warn(), issue));
    }
    gauge.println(format!("  Completion: {:.0}%", state.completion));
}
