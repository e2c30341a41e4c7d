use std::collections::BTreeSet;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use midir::{MidiInput, MidiInputConnection, MidiOutput, MidiOutputConnection};

use crate::selector::{Indicators, InputHandle};

/// Switches a Launchpad Mini MK3 into programmer mode.
const PROGRAMMER_MODE: [u8; 9] = [0xF0, 0x00, 0x20, 0x29, 0x02, 0x0D, 0x0E, 0x01, 0xF7];

const NOTE_ON: u8 = 0x90;
const NOTE_OFF: u8 = 0x80;

const ACTIVE: u8 = 100;
const INACTIVE: u8 = 0;

/// Grid pad id `"{x}x{y}"`, x from the left and y from the top, for a
/// programmer mode note.
pub fn pad_id(note: u8) -> Option<String> {
    let (row, col) = (note / 10, note % 10);
    if !(1..=8).contains(&row) || !(1..=8).contains(&col) {
        return None;
    }
    Some(format!("{}x{}", col - 1, 8 - row))
}

pub fn pad_note(id: &str) -> Option<u8> {
    let (x, y) = id.split_once('x')?;
    let (x, y): (u8, u8) = (x.parse().ok()?, y.parse().ok()?);
    if x > 7 || y > 7 {
        return None;
    }
    Some(10 * (8 - y) + x + 1)
}

#[derive(Debug)]
enum Indicator {
    On(String),
    Off(String),
}

/// Indicator handle for the selector; lights are painted by the worker.
pub struct LaunchpadIndicators {
    tx: Sender<Indicator>,
}

impl Indicators for LaunchpadIndicators {
    fn activate(&mut self, id: &str) {
        let _ = self.tx.send(Indicator::On(id.to_owned()));
    }

    fn deactivate(&mut self, id: &str) {
        let _ = self.tx.send(Indicator::Off(id.to_owned()));
    }
}

/// Start the Launchpad worker thread. Presses go to `inputs`; the returned
/// handle drives the pad lights.
pub fn spawn(port: String, inputs: InputHandle, backoff: Duration) -> LaunchpadIndicators {
    let (tx, rx) = mpsc::channel();
    let worker = Worker { port, inputs, backoff, rx, active: BTreeSet::new() };
    if let Err(e) = thread::Builder::new().name("launchpad".into()).spawn(move || worker.run()) {
        log::error!("Failed to start launchpad thread: {}", e);
    }
    LaunchpadIndicators { tx }
}

struct Worker {
    port: String,
    inputs: InputHandle,
    backoff: Duration,
    rx: Receiver<Indicator>,
    active: BTreeSet<String>,
}

struct Device {
    _input: MidiInputConnection<()>,
    output: MidiOutputConnection,
}

impl Worker {
    fn run(mut self) {
        loop {
            match self.open() {
                Ok(device) => {
                    log::info!("Launchpad connected");
                    if self.serve(device).is_err() {
                        return;
                    }
                    log::warn!("Launchpad disconnected");
                }
                Err(e) => {
                    log::warn!("Failed to open Launchpad: {:#}", e);
                    if !self.idle(self.backoff) {
                        return;
                    }
                }
            }
        }
    }

    fn open(&self) -> anyhow::Result<Device> {
        let midi_in = MidiInput::new("artcar-lights")?;
        let in_port = midi_in
            .ports()
            .into_iter()
            .find(|p| midi_in.port_name(p).map_or(false, |n| n.contains(&self.port)))
            .ok_or_else(|| anyhow::anyhow!("no MIDI input matching {:?}", self.port))?;

        let midi_out = MidiOutput::new("artcar-lights")?;
        let out_port = midi_out
            .ports()
            .into_iter()
            .find(|p| midi_out.port_name(p).map_or(false, |n| n.contains(&self.port)))
            .ok_or_else(|| anyhow::anyhow!("no MIDI output matching {:?}", self.port))?;

        let inputs = self.inputs.clone();
        let input = midi_in
            .connect(&in_port, "launchpad-in", move |_, msg, _| on_message(&inputs, msg), ())
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let mut output = midi_out
            .connect(&out_port, "launchpad-out")
            .map_err(|e| anyhow::anyhow!("{}", e))?;

        output.send(&PROGRAMMER_MODE)?;
        for note in (1..=8).flat_map(|row| (1..=8).map(move |col| 10 * row + col)) {
            output.send(&[NOTE_ON, note, INACTIVE])?;
        }
        Ok(Device { _input: input, output })
    }

    /// Mirror indicator updates to the pad until it vanishes. `Err` means the
    /// selector is gone and the worker should stop.
    fn serve(&mut self, mut device: Device) -> Result<(), ()> {
        for id in &self.active {
            paint(&mut device.output, id, ACTIVE);
        }

        loop {
            match self.rx.recv_timeout(self.backoff) {
                Ok(indicator) => {
                    let (id, velocity) = self.track(indicator);
                    if !paint(&mut device.output, &id, velocity) {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if !self.present() {
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Err(()),
            }
        }
    }

    fn track(&mut self, indicator: Indicator) -> (String, u8) {
        match indicator {
            Indicator::On(id) => {
                self.active.insert(id.clone());
                (id, ACTIVE)
            }
            Indicator::Off(id) => {
                self.active.remove(&id);
                (id, INACTIVE)
            }
        }
    }

    fn present(&self) -> bool {
        MidiInput::new("artcar-lights-probe").map_or(false, |midi| {
            midi.ports()
                .iter()
                .any(|p| midi.port_name(p).map_or(false, |n| n.contains(&self.port)))
        })
    }

    /// Wait out `duration` while keeping indicator state current. Returns
    /// false once the selector is gone.
    fn idle(&mut self, duration: Duration) -> bool {
        match self.rx.recv_timeout(duration) {
            Ok(indicator) => {
                self.track(indicator);
                while let Ok(indicator) = self.rx.try_recv() {
                    self.track(indicator);
                }
                true
            }
            Err(RecvTimeoutError::Timeout) => true,
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }
}

fn paint(output: &mut MidiOutputConnection, id: &str, velocity: u8) -> bool {
    let Some(note) = pad_note(id) else { return true };
    match output.send(&[NOTE_ON, note, velocity]) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Launchpad write failed: {}", e);
            false
        }
    }
}

fn on_message(inputs: &InputHandle, msg: &[u8]) {
    let [status, note, velocity] = match msg {
        [s, n, v] => [*s, *n, *v],
        _ => return,
    };
    let Some(id) = pad_id(note) else { return };

    match status & 0xF0 {
        NOTE_ON if velocity > 0 => {
            log::debug!("Pad {} pressed", id);
            inputs.press(id);
        }
        NOTE_ON | NOTE_OFF => {
            log::debug!("Pad {} released", id);
            inputs.release(id);
        }
        _ => {}
    }
}
