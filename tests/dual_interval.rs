// tests/dual_interval.rs

//! Drives a poller and a publisher together through multi-tick scenarios.

use sensor_uplink::common::{
    ApiKey, BusAddress, ChannelId, FieldIndex, FieldMap, Measurement, SensorBus, SensorMode,
    SensorSettings, SettingsMask, StatusCode, TelemetryTransport,
};
use sensor_uplink::{Millis, PollOutcome, PublishOutcome, SensorPoller, TelemetryPublisher, Uplink, UplinkError};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Read,
    Write(Vec<(u8, f32)>),
}

type EventLog = Rc<RefCell<Vec<Event>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BusFault;

struct ScriptedBus {
    log: EventLog,
    reads: VecDeque<Result<Measurement, BusFault>>,
}

impl SensorBus for ScriptedBus {
    type Error = BusFault;
    type Handle = BusAddress;

    fn create_device_handle(&mut self, address: BusAddress, _settings: SensorSettings) -> BusAddress {
        address
    }

    fn init(&mut self, _handle: &mut BusAddress) -> Result<(), BusFault> {
        Ok(())
    }

    fn set_settings(
        &mut self,
        _handle: &mut BusAddress,
        _settings: &SensorSettings,
        _mask: SettingsMask,
    ) -> Result<(), BusFault> {
        Ok(())
    }

    fn set_mode(&mut self, _handle: &mut BusAddress, _mode: SensorMode) -> Result<(), BusFault> {
        Ok(())
    }

    fn read_all(&mut self, _handle: &mut BusAddress) -> nb::Result<Measurement, BusFault> {
        self.log.borrow_mut().push(Event::Read);
        self.reads
            .pop_front()
            .expect("unexpected sensor read")
            .map_err(nb::Error::Other)
    }
}

struct ScriptedTransport {
    log: EventLog,
    staged: Vec<(u8, f32)>,
    codes: VecDeque<i32>,
}

impl TelemetryTransport for ScriptedTransport {
    type Connection = ();

    fn begin_session(&mut self, _connection: ()) {}

    fn set_field(&mut self, field: FieldIndex, value: f32) {
        self.staged.push((field.get(), value));
    }

    fn write_fields(&mut self, _channel: ChannelId, _api_key: &ApiKey) -> StatusCode {
        let staged = std::mem::take(&mut self.staged);
        self.log.borrow_mut().push(Event::Write(staged));
        StatusCode(self.codes.pop_front().expect("unexpected remote write"))
    }
}

fn build(
    reads: Vec<Result<Measurement, BusFault>>,
    codes: Vec<i32>,
    poll_ms: u32,
    publish_secs: u32,
) -> (Uplink<ScriptedBus, ScriptedTransport>, EventLog) {
    let log: EventLog = Rc::default();
    let bus = ScriptedBus {
        log: log.clone(),
        reads: reads.into(),
    };
    let transport = ScriptedTransport {
        log: log.clone(),
        staged: Vec::new(),
        codes: codes.into(),
    };
    let poller = SensorPoller::configure(bus, BusAddress::PRIMARY, SensorSettings::default(), poll_ms).unwrap();
    let publisher = TelemetryPublisher::configure(
        transport,
        (),
        ApiKey::new("XXXXXXXXXXXXXXXX").unwrap(),
        ChannelId(42),
        publish_secs,
    );
    (Uplink::new(poller, publisher), log)
}

#[test]
fn poll_runs_before_publish_within_a_tick() {
    let (mut uplink, log) = build(vec![Ok(Measurement::new(2500, 51200, 101_325_000))], vec![200], 1000, 60);

    let report = uplink.tick(Millis(0));
    assert!(report.sampled());
    assert!(report.published());
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Read,
            Event::Write(vec![(1, 25.0), (2, 50.0), (3, 101_325.0)])
        ]
    );
}

#[test]
fn independent_cadences() {
    let reads = (0..4).map(|i| Ok(Measurement::new(i * 100, 0, 0))).collect();
    let (mut uplink, log) = build(reads, vec![200, 200], 1000, 3);

    // 1 s sampling, 3 s publishing, ticking every 500 ms for 4.5 s.
    for t in (0..=4500).step_by(500) {
        uplink.tick(Millis(t));
    }

    let log = log.borrow();
    let reads = log.iter().filter(|e| **e == Event::Read).count();
    let writes: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            Event::Write(fields) => Some(fields[0].1),
            Event::Read => None,
        })
        .collect();

    // Reads at 0, 1500, 3000, 4500; writes at 0 and 3500 (with the 3000 sample).
    assert_eq!(reads, 4);
    assert_eq!(writes, vec![0.0, 2.0]);
}

#[test]
fn stale_sample_is_republished_when_poller_skips() {
    let (mut uplink, log) = build(vec![Ok(Measurement::new(1000, 0, 0))], vec![200, 200], 60_000, 1);

    uplink.tick(Millis(0));
    let report = uplink.tick(Millis(1001));
    assert_eq!(report.poll, Ok(PollOutcome::Skipped));
    assert!(report.published());

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert_eq!(log[2], Event::Write(vec![(1, 10.0), (2, 0.0), (3, 0.0)]));
}

#[test]
fn failed_read_suppresses_publish_until_recovery() {
    let (mut uplink, log) = build(
        vec![Err(BusFault), Ok(Measurement::new(2000, 0, 0))],
        vec![200],
        1000,
        60,
    );

    let report = uplink.tick(Millis(0));
    assert_eq!(report.poll, Err(UplinkError::Read(BusFault)));
    assert_eq!(report.publish, None);
    assert_eq!(uplink.measurement(), None);

    // Inside the poll interval: no retry, still nothing to publish.
    let report = uplink.tick(Millis(500));
    assert_eq!(report.poll, Ok(PollOutcome::Skipped));
    assert_eq!(report.publish, None);

    // Recovery: the publisher was never stamped, so it sends right away.
    let report = uplink.tick(Millis(1001));
    assert!(report.sampled());
    assert!(report.published());
    assert_eq!(uplink.measurement(), Some(&Measurement::new(2000, 0, 0)));
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn failing_remote_is_throttled_to_one_attempt_per_interval() {
    let reads = (0..20).map(|_| Ok(Measurement::default())).collect();
    let (mut uplink, log) = build(reads, vec![-301, -301], 100, 300);

    let first = uplink.tick(Millis(0));
    assert_eq!(first.publish, Some(Err(UplinkError::Publish(StatusCode::CONNECT_FAILED))));

    for t in (200..=300_000).step_by(20_000) {
        let report = uplink.tick(Millis(t));
        assert_eq!(report.publish, Some(Ok(PublishOutcome::Skipped)));
    }

    let report = uplink.tick(Millis(300_001));
    assert_eq!(report.publish, Some(Err(UplinkError::Publish(StatusCode(-301)))));

    let writes = log.borrow().iter().filter(|e| matches!(e, Event::Write(_))).count();
    assert_eq!(writes, 2);
}

#[test]
fn step_reads_the_clock() {
    let (mut uplink, _log) = build(vec![Ok(Measurement::default())], vec![200], 1000, 60);
    let now = Cell::new(Millis(77));
    let clock = || now.get();

    uplink.step(&clock);
    assert_eq!(uplink.poller().last_updated(), Some(Millis(77)));
    assert_eq!(uplink.publisher().last_updated(), Some(Millis(77)));
}

#[test]
fn custom_field_map_reaches_the_wire() {
    let (uplink, log) = build(vec![Ok(Measurement::new(100, 1024, 1000))], vec![200], 1000, 60);
    let (poller, publisher) = uplink.into_parts();
    let publisher = publisher.with_field_map(FieldMap::new(3, 1, 2).unwrap());
    let mut uplink = Uplink::new(poller, publisher);

    uplink.tick(Millis(0));
    assert_eq!(
        log.borrow()[1],
        Event::Write(vec![(3, 1.0), (1, 1.0), (2, 1.0)])
    );
}
