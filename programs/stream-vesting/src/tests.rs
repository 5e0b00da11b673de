//! End-to-end lifecycle scenarios replayed against an in-memory token ledger.
//! Each operation runs the same checks and state transitions its instruction
//! handler calls, with token CPIs replaced by ledger moves and the
//! all-or-nothing commit a transaction gives.

use std::collections::HashMap;

use anchor_lang::prelude::*;

use crate::error::{StreamResult, StreamVestingError};
use crate::state::{ControllerStatus, Factory, StreamClosure, StreamController, VestingSchedule};
use crate::utils::flow::Payout;
use crate::utils::rights::{check_transfer, require_holder, run_hook, HookEffect};

const T: i64 = 1_767_225_600;
const RATE: u64 = 155_555_555;

fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

fn admin() -> Pubkey {
    key(1)
}
fn treasury() -> Pubkey {
    key(2)
}
fn factory_custody() -> Pubkey {
    key(3)
}
fn alice() -> Pubkey {
    key(10)
}
fn bob() -> Pubkey {
    key(11)
}
fn carol() -> Pubkey {
    key(12)
}

fn controller_key(id: u64) -> Pubkey {
    let mut b = [0xC0; 32];
    b[..8].copy_from_slice(&id.to_le_bytes());
    Pubkey::new_from_array(b)
}

fn controller_custody(id: u64) -> Pubkey {
    let mut b = [0xCC; 32];
    b[..8].copy_from_slice(&id.to_le_bytes());
    Pubkey::new_from_array(b)
}

fn rights_mint(id: u64) -> Pubkey {
    let mut b = [0xAA; 32];
    b[..8].copy_from_slice(&id.to_le_bytes());
    Pubkey::new_from_array(b)
}

#[derive(Clone)]
struct Sandbox {
    now: i64,
    factory: Factory,
    schedules: Vec<VestingSchedule>,
    controllers: HashMap<u64, StreamController>,
    /// Ownership token registry: schedule id -> holder.
    holders: HashMap<u64, Pubkey>,
    /// Asset balances by token account owner.
    balances: HashMap<Pubkey, u64>,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            now: T,
            factory: Factory {
                campaign: key(0xEE),
                admin: admin(),
                treasury: treasury(),
                asset_mint: key(0xAB),
                schedule_count: 0,
                metadata_base: "ipfs://rights/".to_string(),
                bump: 255,
            },
            schedules: Vec::new(),
            controllers: HashMap::new(),
            holders: HashMap::new(),
            balances: HashMap::new(),
        }
    }

    fn balance(&self, who: &Pubkey) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    fn credit(&mut self, who: Pubkey, amount: u64) {
        *self.balances.entry(who).or_insert(0) += amount;
    }

    fn transfer(&mut self, from: Pubkey, to: Pubkey, amount: u64) {
        if amount == 0 {
            return;
        }
        let b = self.balances.entry(from).or_insert(0);
        assert!(*b >= amount, "ledger underflow");
        *b -= amount;
        self.credit(to, amount);
    }

    fn pay(&mut self, id: u64, payout: Payout) {
        self.transfer(controller_custody(id), payout.to, payout.amount);
    }

    /// Commit only if the whole operation succeeds.
    fn atomically<R>(&mut self, op: impl FnOnce(&mut Sandbox) -> StreamResult<R>) -> StreamResult<R> {
        let mut draft = self.clone();
        let out = op(&mut draft)?;
        *self = draft;
        Ok(out)
    }

    fn schedule(&self, id: u64) -> &VestingSchedule {
        &self.schedules[id as usize]
    }

    fn flow(&self, id: u64, to: &Pubkey) -> u64 {
        self.controllers
            .get(&id)
            .map(|c| c.flow_rate_to(to))
            .unwrap_or(0)
    }

    fn create_schedule(
        &mut self,
        caller: Pubkey,
        recipient: Pubkey,
        rate: u64,
        start: i64,
        end: i64,
    ) -> StreamResult<u64> {
        self.atomically(|p| {
            p.factory.require_admin(&caller)?;
            VestingSchedule::validate_params(&recipient, rate, start, end, p.now)?;
            let id = p.factory.allocate_schedule_id()?;
            p.schedules.push(VestingSchedule {
                factory: key(0xFA),
                schedule_id: id,
                recipient,
                rate_per_second: rate,
                start_time: start,
                end_time: end,
                created_at: p.now,
                executed: false,
                active: true,
                controller: Pubkey::default(),
                rights_mint: Pubkey::default(),
                bump: 250,
            });
            Ok(id)
        })
    }

    /// Split borrow of one schedule and its controller, as a handler sees them.
    fn accounts(&mut self, id: u64) -> (&mut VestingSchedule, Option<&mut StreamController>, u64) {
        let balance = self.balance(&controller_custody(id));
        (
            &mut self.schedules[id as usize],
            self.controllers.get_mut(&id),
            balance,
        )
    }

    fn pay_closure(&mut self, id: u64, closure: Option<StreamClosure>) -> u64 {
        let Some(closure) = closure else {
            return 0;
        };
        if let Some(payout) = closure.payout {
            self.pay(id, payout);
        }
        self.transfer(controller_custody(id), treasury(), closure.remaining);
        closure.remaining
    }

    fn execute(&mut self, caller: Pubkey, id: u64) -> StreamResult<u64> {
        self.atomically(|p| {
            let now = p.now;
            let total = p
                .schedule(id)
                .check_claim(&caller, now, p.balance(&factory_custody()))?;
            let mut controller = StreamController::for_schedule(
                key(0xFA),
                key(0xFB),
                p.schedule(id),
                p.factory.asset_mint,
                controller_custody(id),
                now,
                255,
                255,
            )?;
            p.transfer(factory_custody(), controller_custody(id), total);
            let holder = p.schedule(id).recipient;
            p.holders.insert(id, holder);

            let balance = p.balance(&controller_custody(id));
            p.schedules[id as usize].launch(
                &mut controller,
                controller_key(id),
                rights_mint(id),
                holder,
                now,
                balance,
            )?;
            p.controllers.insert(id, controller);
            Ok(total)
        })
    }

    fn direct_execute(&mut self, caller: Pubkey, id: u64) -> StreamResult<()> {
        self.atomically(|p| {
            p.factory.require_admin(&caller)?;
            let now = p.now;
            let (schedule, controller, balance) = p.accounts(id);
            let closure = schedule.direct_execute(controller, rights_mint(id), now, balance)?;
            p.pay_closure(id, closure);
            let recipient = p.schedule(id).recipient;
            p.holders.insert(id, recipient);
            Ok(())
        })
    }

    fn transfer_rights(&mut self, caller: Pubkey, id: u64, to: Pubkey) -> StreamResult<()> {
        self.atomically(|p| {
            let from = *p.holders.get(&id).ok_or(StreamVestingError::Unauthorized)?;
            check_transfer(&from, &caller, &to)?;
            p.holders.insert(id, to);

            let now = p.now;
            let (schedule, controller, balance) = p.accounts(id);
            if let HookEffect::Redirected(payout) =
                run_hook(schedule, controller, Some(from), Some(to), now, balance)?
            {
                p.pay(id, payout);
            }
            Ok(())
        })
    }

    fn burn_rights(&mut self, caller: Pubkey, id: u64) -> StreamResult<()> {
        self.atomically(|p| {
            let holder = *p.holders.get(&id).ok_or(StreamVestingError::Unauthorized)?;
            require_holder(&holder, &caller)?;
            p.holders.remove(&id);

            let now = p.now;
            let (schedule, controller, balance) = p.accounts(id);
            let HookEffect::Retired(closure) =
                run_hook(schedule, controller, Some(holder), None, now, balance)?
            else {
                return Err(StreamVestingError::StreamError);
            };
            p.pay_closure(id, closure);
            Ok(())
        })
    }

    fn stop_stream(&mut self, caller: Pubkey, id: u64) -> StreamResult<u64> {
        self.atomically(|p| {
            p.factory.require_admin(&caller)?;
            let now = p.now;
            let (schedule, controller, balance) = p.accounts(id);
            let controller = controller.ok_or(StreamVestingError::ControllerMismatch)?;
            let closure = schedule
                .retire(Some(controller), now, balance)?
                .ok_or(StreamVestingError::ControllerMismatch)?;
            Ok(p.pay_closure(id, Some(closure)))
        })
    }

    fn settle(&mut self, id: u64) -> StreamResult<u64> {
        self.atomically(|p| {
            let now = p.now;
            let holder = p.holders[&id];
            let (_, controller, balance) = p.accounts(id);
            let controller = controller.ok_or(StreamVestingError::ControllerMismatch)?;
            let payout = controller.settle_holder(&holder, now, balance)?;
            p.pay(id, payout);
            Ok(payout.amount)
        })
    }
}

/// Reference window: [T + 1 day, T + 365 days] at 155,555,555 units/sec.
fn reference_schedule(p: &mut Sandbox) -> u64 {
    p.create_schedule(admin(), alice(), RATE, T + 86_400, T + 31_536_000)
        .unwrap()
}

fn total() -> u64 {
    RATE * 31_449_600
}

#[test]
fn schedule_ids_strictly_increase() {
    let mut p = Sandbox::new();
    let a = reference_schedule(&mut p);
    let b = reference_schedule(&mut p);
    assert!(matches!(
        p.create_schedule(admin(), alice(), 0, T + 1, T + 2),
        Err(StreamVestingError::InvalidParameters)
    ));
    let c = reference_schedule(&mut p);
    assert_eq!((a, b, c), (0, 1, 2));
    assert_eq!(p.factory.schedule_count, 3);
}

#[test]
fn only_admin_schedules() {
    let mut p = Sandbox::new();
    assert!(matches!(
        p.create_schedule(alice(), alice(), RATE, T + 1, T + 2),
        Err(StreamVestingError::Unauthorized)
    ));
    assert_eq!(p.factory.schedule_count, 0);
}

#[test]
fn execute_before_start_fails() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_399;

    assert!(matches!(p.execute(alice(), id), Err(StreamVestingError::StreamError)));
    assert!(!p.schedule(id).executed);
    assert_eq!(p.balance(&factory_custody()), total());
}

#[test]
fn execute_underfunded_fails_without_side_effects() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total() - 1);
    p.now = T + 86_400;

    assert!(matches!(p.execute(alice(), id), Err(StreamVestingError::BalanceError)));
    assert!(!p.schedule(id).executed);
    assert!(!p.holders.contains_key(&id));
    assert!(p.controllers.is_empty());
    assert_eq!(p.balance(&factory_custody()), total() - 1);
}

#[test]
fn execute_by_stranger_is_unauthorized() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;

    assert!(matches!(p.execute(bob(), id), Err(StreamVestingError::Unauthorized)));
}

#[test]
fn full_lifecycle_follows_the_token() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total() + 500);
    p.now = T + 86_400;

    // (c) claim opens the flow to Alice, funded with exactly the scheduled total.
    assert_eq!(p.execute(alice(), id).unwrap(), total());
    assert_eq!(p.balance(&controller_custody(id)), total());
    assert_eq!(p.balance(&factory_custody()), 500);
    assert_eq!(p.flow(id, &alice()), RATE);

    // (d) Alice -> Bob moves the whole rate.
    p.now += 100;
    p.transfer_rights(alice(), id, bob()).unwrap();
    assert_eq!(p.flow(id, &alice()), 0);
    assert_eq!(p.flow(id, &bob()), RATE);
    assert_eq!(p.balance(&alice()), RATE * 100);

    // (e) stop: Bob's flow goes to zero, the rest lands in treasury.
    p.now += 50;
    let before = p.balance(&controller_custody(id));
    let swept = p.stop_stream(admin(), id).unwrap();
    assert_eq!(p.flow(id, &bob()), 0);
    assert_eq!(p.balance(&bob()), RATE * 50);
    assert_eq!(swept, before - RATE * 50);
    assert_eq!(p.balance(&treasury()), swept);
    assert_eq!(p.balance(&controller_custody(id)), 0);
    assert!(!p.schedule(id).active);

    // Second stop observes zero custody and moves nothing.
    assert_eq!(p.stop_stream(admin(), id).unwrap(), 0);
    assert_eq!(p.balance(&treasury()), swept);
}

#[test]
fn settle_pays_current_holder_only() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    p.now += 10;
    assert_eq!(p.settle(id).unwrap(), RATE * 10);
    assert_eq!(p.settle(id).unwrap(), 0);
    assert_eq!(p.balance(&alice()), RATE * 10);
    assert_eq!(p.flow(id, &alice()), RATE);
}

#[test]
fn repeated_transfers_keep_one_flow() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    p.transfer_rights(alice(), id, bob()).unwrap();
    p.transfer_rights(bob(), id, carol()).unwrap();
    p.transfer_rights(carol(), id, alice()).unwrap();

    let live: Vec<u64> = [alice(), bob(), carol()]
        .iter()
        .map(|w| p.flow(id, w))
        .collect();
    assert_eq!(live, vec![RATE, 0, 0]);
}

#[test]
fn only_holder_transfers() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    assert!(matches!(
        p.transfer_rights(bob(), id, bob()),
        Err(StreamVestingError::Unauthorized)
    ));
    assert_eq!(p.flow(id, &alice()), RATE);
}

#[test]
fn burn_stops_and_retires() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    p.now += 20;
    p.burn_rights(alice(), id).unwrap();
    assert!(!p.schedule(id).active);
    assert_eq!(p.flow(id, &alice()), 0);
    assert_eq!(p.balance(&alice()), RATE * 20);
    assert_eq!(p.balance(&treasury()), total() - RATE * 20);
    assert_eq!(p.controllers[&id].status, ControllerStatus::Closed);
}

#[test]
fn second_execute_fails() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total() * 2);
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    assert!(matches!(p.execute(alice(), id), Err(StreamVestingError::StreamError)));
    assert_eq!(p.balance(&factory_custody()), total());
    assert_eq!(p.balance(&controller_custody(id)), total());
}

#[test]
fn direct_after_execute_cannot_double_open() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total() * 2);
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    assert!(matches!(
        p.direct_execute(admin(), id),
        Err(StreamVestingError::StreamError)
    ));
    assert_eq!(p.controllers.len(), 1);
    assert_eq!(p.controllers[&id].status, ControllerStatus::Flowing);
    assert_eq!(p.balance(&controller_custody(id)), total());
}

#[test]
fn execute_after_direct_cannot_fund() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());

    // Direct execution ignores the start time and moves no funds.
    p.direct_execute(admin(), id).unwrap();
    assert!(p.schedule(id).executed);
    assert_eq!(p.holders[&id], alice());
    assert_eq!(p.balance(&factory_custody()), total());
    assert!(p.controllers.is_empty());

    p.now = T + 86_400;
    assert!(matches!(p.execute(alice(), id), Err(StreamVestingError::StreamError)));
    assert!(p.controllers.is_empty());
    assert_eq!(p.balance(&factory_custody()), total());

    // No stream to redirect; the token still moves.
    p.transfer_rights(alice(), id, bob()).unwrap();
    assert_eq!(p.holders[&id], bob());
    assert_eq!(p.flow(id, &bob()), 0);
}

#[test]
fn direct_execute_is_admin_only() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    assert!(matches!(
        p.direct_execute(alice(), id),
        Err(StreamVestingError::Unauthorized)
    ));
    assert!(!p.schedule(id).executed);
}

#[test]
fn transfer_after_stop_leaves_closed_stream_alone() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();
    p.stop_stream(admin(), id).unwrap();

    p.transfer_rights(alice(), id, bob()).unwrap();
    assert_eq!(p.flow(id, &bob()), 0);
    assert_eq!(p.controllers[&id].status, ControllerStatus::Closed);
}

#[test]
fn burn_after_direct_execute_only_retires() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.direct_execute(admin(), id).unwrap();

    p.burn_rights(alice(), id).unwrap();
    assert!(!p.schedule(id).active);
    assert!(!p.holders.contains_key(&id));
    assert_eq!(p.balance(&treasury()), 0);
    assert_eq!(p.balance(&factory_custody()), total());
}

#[test]
fn stop_needs_a_stream() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.direct_execute(admin(), id).unwrap();

    assert!(matches!(
        p.stop_stream(admin(), id),
        Err(StreamVestingError::ControllerMismatch)
    ));
    assert!(p.schedule(id).active);
}

#[test]
fn settle_after_transfer_pays_new_holder() {
    let mut p = Sandbox::new();
    let id = reference_schedule(&mut p);
    p.credit(factory_custody(), total());
    p.now = T + 86_400;
    p.execute(alice(), id).unwrap();

    p.now += 5;
    p.transfer_rights(alice(), id, bob()).unwrap();
    p.now += 7;
    assert_eq!(p.settle(id).unwrap(), RATE * 7);
    assert_eq!(p.balance(&alice()), RATE * 5);
    assert_eq!(p.balance(&bob()), RATE * 7);
    assert_eq!(p.controllers[&id].streamed_total, RATE * 12);
}
