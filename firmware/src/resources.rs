use assign_resources::assign_resources;
use embassy_rp::Peri;
use embassy_rp::peripherals;

// group the peripherals into resources, one group per device function
// this is the whole BitDogLab pin map the firmware touches; the blue
// channel of the on-board RGB LED (PIN_12) is not used
assign_resources! {
    button: ButtonResources {
        pin: PIN_5,
    },
    indicators: IndicatorResources {
        green: PIN_11,
        red: PIN_13,
    },
    buzzer: BuzzerResources {
        slice: PWM_SLICE2,
        pin: PIN_21,
    },
    display: DisplayResources {
        i2c: I2C1,
        sda: PIN_14,
        scl: PIN_15,
    },
}
