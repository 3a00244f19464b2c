//! The four tasks on the real single-threaded executor.

use std::time::Duration;

use edge_executor::LocalExecutor;

use drinkmon::app::events::AppEvent;
use drinkmon::config::DeviceConfig;
use drinkmon::scheduler::{ControllerHardware, Scheduler};

use crate::mock_hw::{
    ManualClock, MockButton, MockLight, MockRegistry, MockSensor, RecordingSink,
};

fn fast_config() -> DeviceConfig {
    let mut config = DeviceConfig::with_color((1, 2, 3));
    config.sensor_period_ms = 10;
    config.button_poll_ms = 5;
    config.breath_frame_ms = 5;
    config.breath_idle_ms = 5;
    config
}

#[test]
fn tasks_share_state_on_one_executor() {
    let sensor = MockSensor::new();
    let light = MockLight::new();
    let registry = MockRegistry::new();
    let sink = RecordingSink::new();
    registry.set_peers(Ok(vec![(255, 0, 0)]));
    sensor.set_distance(400);

    let scheduler = Scheduler::new(
        &fast_config(),
        ControllerHardware {
            sensor: sensor.clone(),
            light: light.clone(),
            button: MockButton::new(),
        },
        registry.clone(),
        ManualClock::new(),
        sink.clone(),
    );
    let view = scheduler.view();

    let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
    scheduler.spawn_on(&executor);
    futures_lite::future::block_on(
        executor.run(async_io_mini::Timer::after(Duration::from_millis(100))),
    );

    assert!(view.is_active());
    assert_eq!(view.peer_colors().as_slice(), &[(255, 0, 0)]);
    assert_eq!(registry.start_calls(), vec![(1, 2, 3)]);
    assert_eq!(registry.list_calls(), 1);
    assert_eq!(
        sink.events().first(),
        Some(&AppEvent::Started {
            own_color: (1, 2, 3)
        })
    );
    // Presence and breath both rendered more than once.
    assert!(light.frames().len() > 4);
}
