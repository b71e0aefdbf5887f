//! Stream lifecycle tests: PLL power sequencing, coefficient-shadow flushes
//! and mute orchestration, driven through a scripted register store.
//!
//! The hardware rule under test: coefficient RAM accepts writes only while
//! a PLL is locked, so every control write lands in the shadow first and
//! the driver decides when bytes actually move.
//!
//! Run with: cargo test -p tscs42xx --test stream_lifecycle

use regmap::{MockStore, Transaction};
use tscs42xx::coeff::COEFF_COUNT;
use tscs42xx::driver::COEFF_BUSY_POLL_BUDGET;
use tscs42xx::registers::{
    RM_AIC1_MS, RM_AIC1_WL, RM_CNVRTR0_ADCMU, RM_CNVRTR1_DACMU, RM_PLLCTL0_PLL1_LOCK,
    RM_PLLCTL1C_PDB_PLL1, RM_PLLCTL1C_PDB_PLL2, RV_AIC1_MS_MASTER, RV_AIC1_WL_32, R_AIC1,
    R_CNVRTR0, R_CNVRTR1, R_DACCRADDR, R_DACCRSTAT, R_DACCRWRL, R_DEVIDH, R_DEVIDL, R_PLLCTL0,
    R_PLLCTL1C,
};
use tscs42xx::{
    CodecError, SampleWidth, StreamDirection, SysclkSource, Tscs42xx, WindowSize,
    COEFF_RAM_MAX_ADDR,
};

/// Mock with the PLL lock detector reporting locked.
fn locked_mock() -> MockStore {
    let mock = MockStore::new();
    mock.set(R_PLLCTL0, RM_PLLCTL0_PLL1_LOCK);
    mock
}

/// Values written to the coefficient address register, in log order.
fn addr_writes(mock: &MockStore) -> Vec<u8> {
    mock.with_log(|log| {
        log.iter()
            .filter_map(|t| match t {
                Transaction::Write { reg, val } if *reg == R_DACCRADDR => Some(*val),
                _ => None,
            })
            .collect()
    })
}

/// (address, payload) pairs for every burst through the write port.
fn coeff_writes(mock: &MockStore) -> Vec<(u8, Vec<u8>)> {
    mock.with_log(|log| {
        let mut out = Vec::new();
        let mut cur_addr = None;
        for t in log {
            match t {
                Transaction::Write { reg, val } if *reg == R_DACCRADDR => cur_addr = Some(*val),
                Transaction::BulkWrite { reg, data } if *reg == R_DACCRWRL => {
                    if let Some(addr) = cur_addr {
                        out.push((addr, data.to_vec()));
                    }
                }
                _ => {}
            }
        }
        out
    })
}

/// The first lock event flushes every coefficient, in ascending address
/// order, and powers the right PLL.
#[tokio::test]
async fn power_up_flushes_the_whole_shadow_ascending() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);

    codec.power_up(48_000).await.expect("power up");

    assert_ne!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL1, 0);
    assert_eq!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL2, 0);

    let addrs = addr_writes(&mock);
    let expected: Vec<u8> = (0..=COEFF_RAM_MAX_ADDR).collect();
    assert_eq!(addrs.len(), COEFF_COUNT);
    assert_eq!(addrs, expected, "flush must walk addresses 0x00..=0xCD");
    assert!(!mock.overflowed());
}

/// A second power-up with an unchanged shadow produces no coefficient
/// traffic at all.
#[tokio::test]
async fn second_power_up_skips_the_flush() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);

    codec.power_up(48_000).await.expect("first power up");
    assert_eq!(addr_writes(&mock).len(), COEFF_COUNT);

    codec.power_up(48_000).await.expect("second power up");
    assert_eq!(addr_writes(&mock).len(), COEFF_COUNT);
    assert!(!mock.overflowed());
}

/// The 44.1 kHz family runs from the other PLL; unmapped rates are
/// rejected before any register is touched.
#[tokio::test]
async fn rate_family_selects_the_pll() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    codec.power_up(44_100).await.expect("power up");
    assert_ne!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL2, 0);
    assert_eq!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL1, 0);

    mock.clear_log();
    let err = codec.power_up(12_345).await.expect_err("no family");
    assert_eq!(err, CodecError::InvalidParameter);
    let err = codec.power_up(24_000).await.expect_err("no pll at 24k");
    assert_eq!(err, CodecError::InvalidParameter);
    mock.with_log(|log| assert!(log.is_empty(), "rejected rates touch nothing"));
}

/// A put with the PLL down succeeds, touches no coefficient registers, and
/// the window reaches the device inside the next lock-event flush with the
/// new payload and ascending addresses.
#[tokio::test]
async fn put_while_unlocked_is_deferred_to_the_next_lock_event() {
    let mock = MockStore::new();
    let codec = Tscs42xx::new(&mock);

    let payload: Vec<u8> = (0x10..0x1F).collect();
    codec.put_coeff(0x20, &payload).await.expect("put");
    assert!(addr_writes(&mock).is_empty(), "no traffic while unlocked");
    assert!(!mock.overflowed());

    mock.set(R_PLLCTL0, RM_PLLCTL0_PLL1_LOCK);
    codec.power_up(48_000).await.expect("power up");

    // Within the full flush this window's addresses appear exactly once
    // each, ascending, carrying the bytes from the put.
    let window: Vec<u8> = addr_writes(&mock)
        .into_iter()
        .filter(|addr| (0x20..=0x24).contains(addr))
        .collect();
    assert_eq!(window, vec![0x20, 0x21, 0x22, 0x23, 0x24]);

    let writes = coeff_writes(&mock);
    let by_addr = |addr: u8| -> Vec<u8> {
        writes
            .iter()
            .rev()
            .find(|(w, _)| *w == addr)
            .map(|(_, data)| data.clone())
            .expect("address flushed")
    };
    assert_eq!(by_addr(0x20), vec![0x10, 0x11, 0x12]);
    assert_eq!(by_addr(0x24), vec![0x1C, 0x1D, 0x1E]);
    // The neighbour keeps its power-on default.
    assert_eq!(by_addr(0x25), vec![0x00, 0x00, 0x40]);
}

/// A put while locked writes through just its own window.
#[tokio::test]
async fn put_while_locked_flushes_only_its_window() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    codec.power_up(48_000).await.expect("power up");
    mock.clear_log();

    codec.put_coeff(0x20, &[0x11; 15]).await.expect("put");
    assert_eq!(addr_writes(&mock), vec![0x20, 0x21, 0x22, 0x23, 0x24]);

    // The write-through re-synchronized the shadow, so the next power-up
    // has nothing to flush.
    mock.clear_log();
    codec.power_up(48_000).await.expect("power up again");
    assert!(addr_writes(&mock).is_empty());
    assert!(!mock.overflowed());
}

/// Lock never confirmed: the driver reports a timeout but leaves the PLL
/// enabled for the caller to inspect or retry, and no coefficient traffic
/// happens.
#[tokio::test]
async fn pll_lock_timeout_leaves_the_pll_enabled() {
    let mock = MockStore::new();
    let codec = Tscs42xx::new(&mock);

    let err = codec.power_up(48_000).await.expect_err("must time out");
    assert_eq!(err, CodecError::HardwareTimeout);
    assert_ne!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL1, 0);
    assert!(addr_writes(&mock).is_empty());
    assert!(!mock.overflowed());
}

/// Lock that appears on the second read, after the poll interval, is good
/// enough.
#[tokio::test]
async fn lock_poll_retries_once_after_the_interval() {
    let mock = locked_mock();
    mock.enqueue_read(R_PLLCTL0, &[0x00]);
    let codec = Tscs42xx::new(&mock);

    codec.power_up(48_000).await.expect("locks on second read");
    assert_eq!(mock.read_count(R_PLLCTL0), 2);
    assert_eq!(addr_writes(&mock).len(), COEFF_COUNT);
}

/// Mute order: converter first, then PLL power-down.
#[tokio::test]
async fn mute_orders_converter_before_pll_power_down() {
    let mock = locked_mock();
    mock.set(R_PLLCTL1C, RM_PLLCTL1C_PDB_PLL1 | RM_PLLCTL1C_PDB_PLL2);
    let codec = Tscs42xx::new(&mock);

    codec
        .on_mute(StreamDirection::Playback, true)
        .await
        .expect("mute");

    assert_ne!(mock.value(R_CNVRTR1) & RM_CNVRTR1_DACMU, 0);
    assert_eq!(
        mock.value(R_PLLCTL1C) & (RM_PLLCTL1C_PDB_PLL1 | RM_PLLCTL1C_PDB_PLL2),
        0
    );
    mock.with_log(|log| {
        let mute_idx = log
            .iter()
            .position(|t| matches!(t, Transaction::Write { reg, .. } if *reg == R_CNVRTR1))
            .expect("mute write");
        let pll_idx = log
            .iter()
            .position(|t| matches!(t, Transaction::Write { reg, .. } if *reg == R_PLLCTL1C))
            .expect("pll write");
        assert!(mute_idx < pll_idx, "converter must mute before power-down");
    });
}

/// If the power-down step of a mute fails, the failure surfaces but the
/// converter stays muted.
#[tokio::test]
async fn failed_power_down_during_mute_keeps_the_mute_bit() {
    let mock = locked_mock();
    mock.set(R_PLLCTL1C, RM_PLLCTL1C_PDB_PLL1);
    mock.fail_writes_to(R_PLLCTL1C);
    let codec = Tscs42xx::new(&mock);

    let err = codec
        .on_mute(StreamDirection::Playback, true)
        .await
        .expect_err("power-down must fail");
    assert!(matches!(err, CodecError::Transport(_)));
    assert_ne!(
        mock.value(R_CNVRTR1) & RM_CNVRTR1_DACMU,
        0,
        "mute bit must survive the power-down failure"
    );
}

/// If the mute write fails the PLLs keep running.
#[tokio::test]
async fn failed_mute_write_keeps_the_plls_running() {
    let mock = locked_mock();
    mock.set(R_PLLCTL1C, RM_PLLCTL1C_PDB_PLL1);
    mock.fail_writes_to(R_CNVRTR1);
    let codec = Tscs42xx::new(&mock);

    let err = codec
        .on_mute(StreamDirection::Playback, true)
        .await
        .expect_err("mute must fail");
    assert!(matches!(err, CodecError::Transport(_)));
    assert_ne!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL1, 0);
}

/// Unmute order: power up and confirm lock, then clear the converter mute.
#[tokio::test]
async fn unmute_confirms_lock_before_clearing_the_converter_mute() {
    let mock = locked_mock();
    mock.set(R_CNVRTR1, RM_CNVRTR1_DACMU);
    let codec = Tscs42xx::new(&mock);
    codec
        .on_hw_params(48_000, SampleWidth::W16)
        .await
        .expect("hw params");
    mock.clear_log();

    codec
        .on_mute(StreamDirection::Playback, false)
        .await
        .expect("unmute");

    assert_eq!(mock.value(R_CNVRTR1) & RM_CNVRTR1_DACMU, 0);
    mock.with_log(|log| {
        let lock_read = log
            .iter()
            .position(|t| matches!(t, Transaction::Read { reg } if *reg == R_PLLCTL0))
            .expect("lock confirm");
        let unmute_idx = log
            .iter()
            .position(|t| matches!(t, Transaction::Write { reg, .. } if *reg == R_CNVRTR1))
            .expect("unmute write");
        assert!(lock_read < unmute_idx, "lock confirm must precede unmute");
    });
}

/// A failed unmute powers the PLLs back down instead of leaving them
/// running against a muted converter.
#[tokio::test]
async fn failed_unmute_powers_the_plls_back_down() {
    let mock = locked_mock();
    mock.set(R_CNVRTR1, RM_CNVRTR1_DACMU);
    mock.fail_writes_to(R_CNVRTR1);
    let codec = Tscs42xx::new(&mock);
    codec
        .on_hw_params(48_000, SampleWidth::W16)
        .await
        .expect("hw params");

    let err = codec
        .on_mute(StreamDirection::Playback, false)
        .await
        .expect_err("unmute must fail");
    assert!(matches!(err, CodecError::Transport(_)));
    assert_eq!(
        mock.value(R_PLLCTL1C) & (RM_PLLCTL1C_PDB_PLL1 | RM_PLLCTL1C_PDB_PLL2),
        0
    );
}

/// Unmute with no recorded sample rate cannot pick a PLL.
#[tokio::test]
async fn unmute_without_hw_params_is_rejected() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    let err = codec
        .on_mute(StreamDirection::Playback, false)
        .await
        .expect_err("no rate recorded");
    assert_eq!(err, CodecError::InvalidParameter);
}

/// Capture mute lands in the ADC converter register.
#[tokio::test]
async fn capture_direction_uses_the_adc_converter() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    codec
        .on_mute(StreamDirection::Capture, true)
        .await
        .expect("mute capture");
    assert_ne!(mock.value(R_CNVRTR0) & RM_CNVRTR0_ADCMU, 0);
    assert_eq!(mock.value(R_CNVRTR1) & RM_CNVRTR1_DACMU, 0);
}

/// A permanently busy coefficient port exhausts the poll budget and
/// surfaces a timeout.
#[tokio::test]
async fn coefficient_port_busy_timeout_gives_up() {
    let mock = locked_mock();
    mock.set(R_DACCRSTAT, 0x01);
    let codec = Tscs42xx::new(&mock);

    let err = codec.power_up(48_000).await.expect_err("port wedged");
    assert_eq!(err, CodecError::HardwareTimeout);
    assert!(addr_writes(&mock).is_empty());
    assert_eq!(mock.read_count(R_DACCRSTAT), COEFF_BUSY_POLL_BUDGET as usize);
}

/// A port that reports busy a few times and then goes idle stays within
/// the budget.
#[tokio::test]
async fn coefficient_port_busy_recovers_within_budget() {
    let mock = locked_mock();
    mock.enqueue_read(R_DACCRSTAT, &[0x01, 0x01, 0x01]);
    let codec = Tscs42xx::new(&mock);

    codec.power_up(48_000).await.expect("flush completes");
    assert_eq!(addr_writes(&mock).len(), COEFF_COUNT);
}

/// Between a completed power-down and the next confirmed lock, a put
/// produces no coefficient-port traffic at all; the following lock event
/// flushes the deferred window.
#[tokio::test]
async fn no_coefficient_traffic_between_power_down_and_next_lock() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    codec.power_up(48_000).await.expect("power up");
    codec.power_down().await.expect("power down");
    // The lock detector drops with the PLL.
    mock.set(R_PLLCTL0, 0x00);
    mock.clear_log();

    codec.put_coeff(0x40, &[0x33; 15]).await.expect("put");
    assert!(addr_writes(&mock).is_empty());
    mock.with_log(|log| {
        assert!(
            log.iter()
                .all(|t| !matches!(t, Transaction::BulkWrite { .. })),
            "no write-port bursts while unlocked"
        );
    });

    mock.set(R_PLLCTL0, RM_PLLCTL0_PLL1_LOCK);
    codec.power_up(48_000).await.expect("relock");
    let last = coeff_writes(&mock)
        .into_iter()
        .rev()
        .find(|(addr, _)| *addr == 0x40)
        .map(|(_, data)| data)
        .expect("deferred window flushed");
    assert_eq!(last, vec![0x33, 0x33, 0x33]);
    assert!(!mock.overflowed());
}

/// Reads are served from the shadow with zero bus traffic, PLLs down or up.
#[tokio::test]
async fn get_never_touches_the_bus() {
    let mock = MockStore::new();
    let codec = Tscs42xx::new(&mock);

    let window = codec
        .get_coeff(0x00, WindowSize::Biquad)
        .await
        .expect("get");
    // Power-on defaults: only the first coefficient in this window is a
    // normalization slot (last byte unity gain).
    let expected = [0x00, 0x00, 0x40, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
    assert_eq!(window.as_slice(), expected.as_slice());
    mock.with_log(|log| assert!(log.is_empty(), "get must not touch the bus"));
}

/// Size and range validation on the control surface.
#[tokio::test]
async fn window_validation_rejects_bad_sizes_and_addresses() {
    let mock = MockStore::new();
    let codec = Tscs42xx::new(&mock);

    let err = codec.put_coeff(0x00, &[0x00; 4]).await.expect_err("len 4");
    assert_eq!(err, CodecError::InvalidParameter);
    let err = codec.put_coeff(0x00, &[]).await.expect_err("empty");
    assert_eq!(err, CodecError::InvalidParameter);

    // A biquad starting at 0xCA would run past the last address 0xCD.
    let err = codec
        .put_coeff(0xCA, &[0x00; 15])
        .await
        .expect_err("overrun");
    assert_eq!(err, CodecError::InvalidParameter);
    codec
        .put_coeff(0xCD, &[0x01, 0x02, 0x03])
        .await
        .expect("top single coefficient fits");

    let err = codec
        .get_coeff(0xCE, WindowSize::Single)
        .await
        .expect_err("past the end");
    assert_eq!(err, CodecError::InvalidParameter);
    assert_eq!(
        codec
            .get_coeff(0xC9, WindowSize::Biquad)
            .await
            .expect("last biquad")
            .len(),
        15
    );
}

/// A transport failure during the opportunistic write-through is not fatal:
/// the put succeeds, the shadow keeps the new value, and the next lock
/// event carries it to the device.
#[tokio::test]
async fn put_transport_failure_is_deferred_not_fatal() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);
    codec.power_up(48_000).await.expect("power up");
    mock.clear_log();

    mock.fail_writes_to(R_DACCRADDR);
    codec
        .put_coeff(0x20, &[0x22; 15])
        .await
        .expect("put commits to the shadow even when the flush fails");
    let window = codec
        .get_coeff(0x20, WindowSize::Biquad)
        .await
        .expect("get");
    assert_eq!(window.as_slice(), &[0x22; 15]);

    mock.clear_failures();
    codec.power_up(48_000).await.expect("retry flush");
    let last_at_0x20 = coeff_writes(&mock)
        .into_iter()
        .rev()
        .find(|(addr, _)| *addr == 0x20)
        .map(|(_, data)| data)
        .expect("window flushed");
    assert_eq!(last_at_0x20, vec![0x22, 0x22, 0x22]);
}

/// Concurrent puts and a power-up serialize on the internal locks and end
/// with shadow and device in agreement.
#[tokio::test]
async fn concurrent_puts_and_power_up_stay_consistent() {
    let mock = locked_mock();
    let codec = Tscs42xx::new(&mock);

    let (a, b, c) = tokio::join!(
        codec.put_coeff(0x00, &[0x01; 15]),
        codec.put_coeff(0x40, &[0x02; 15]),
        codec.power_up(48_000),
    );
    a.expect("put 0x00");
    b.expect("put 0x40");
    c.expect("power up");

    let writes = coeff_writes(&mock);
    let last = |addr: u8| -> Vec<u8> {
        writes
            .iter()
            .rev()
            .find(|(w, _)| *w == addr)
            .map(|(_, data)| data.clone())
            .expect("address written")
    };
    assert_eq!(last(0x00), vec![0x01, 0x01, 0x01]);
    assert_eq!(last(0x40), vec![0x02, 0x02, 0x02]);

    // Everything settled in sync: one more power-up is traffic-free.
    let before = addr_writes(&mock).len();
    codec.power_up(48_000).await.expect("settled");
    assert_eq!(addr_writes(&mock).len(), before);
    assert!(!mock.overflowed());
}

/// The whole bring-up conversation a machine driver would have with the
/// part, end to end.
#[tokio::test]
async fn full_bring_up_sequence() {
    let mock = locked_mock();
    mock.set(R_DEVIDH, 0x4A);
    mock.set(R_DEVIDL, 0x74);
    let codec = Tscs42xx::new(&mock);

    codec.probe().await.expect("probe");
    codec.set_master().await.expect("set master");
    codec
        .on_set_sysclk_source(SysclkSource::Xtal, 12_288_000)
        .await
        .expect("sysclk");
    codec
        .on_hw_params(48_000, SampleWidth::W32)
        .await
        .expect("hw params");
    codec.on_set_bclk_ratio(32).await.expect("bclk ratio");
    codec
        .on_mute(StreamDirection::Playback, false)
        .await
        .expect("unmute");

    assert_eq!(mock.value(R_AIC1) & RM_AIC1_MS, RV_AIC1_MS_MASTER);
    assert_eq!(mock.value(R_AIC1) & RM_AIC1_WL, RV_AIC1_WL_32);
    assert_ne!(mock.value(R_PLLCTL1C) & RM_PLLCTL1C_PDB_PLL1, 0);
    assert_eq!(mock.value(R_CNVRTR1) & RM_CNVRTR1_DACMU, 0);
    assert_eq!(addr_writes(&mock).len(), COEFF_COUNT);
    assert!(!mock.overflowed());
}
