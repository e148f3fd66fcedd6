//! Event sink that writes every domain event to the serial log.
//!
//! Always installed; the display and network surfaces layer on top.

use log::info;

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::PumpStateChanged { from, to } => {
                info!("event: pump {:?} -> {:?}", from, to);
            }
            AppEvent::SampleCommitted(r) => {
                info!(
                    "event: sample committed ntu={:.2} volts={:.2} (avg {:.2} NTU / {:.2} V)",
                    r.turbidity, r.voltage, r.turbidity_avg, r.voltage_avg
                );
            }
            AppEvent::CleanChanged(clean) => {
                info!("event: water {}", if *clean { "clean" } else { "turbid" });
            }
            AppEvent::ConnectivityChanged { connected } => {
                info!("event: link {}", if *connected { "up" } else { "down" });
            }
            AppEvent::Started => {
                info!("event: controller started");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::pump::PumpState;

    // Emitting must never panic regardless of payload.
    #[test]
    fn emits_all_variants() {
        let mut sink = LogEventSink;
        sink.emit(&AppEvent::Started);
        sink.emit(&AppEvent::CleanChanged(true));
        sink.emit(&AppEvent::ConnectivityChanged { connected: false });
        sink.emit(&AppEvent::PumpStateChanged {
            from: PumpState::Stopped,
            to: PumpState::Running,
        });
    }
}
