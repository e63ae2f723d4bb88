#![cfg_attr(not(feature = "std"), no_std, no_main)]

/// # Simple Lottery — Tiered Prize Draw Engine
///
/// **Role:** Collects fixed-price ticket purchases for one round at a time,
/// requests verifiable randomness from an external oracle account, and
/// settles the round by partitioning the players into per-tier winner sets
/// and pushing out floor-divided payouts.
///
/// **Round lifecycle:**
/// ```text
///   Closed ──open_lottery()──► Open ──request_winner()──► Picking
///     ▲                          │                           │
///     │                          └ enter_lottery()           │
///     │                            (payable, EOA only)       │
///     └──── fulfill_random_words(id, words) — oracle only ◄──┘
/// ```
///
/// The oracle is the *only* account authorised to deliver randomness, and a
/// request id is consumed exactly once.  Every payout, the round reset and
/// the permanent replay ledger are bound to that id, so a draw can be
/// reconstructed off-chain from events alone.
///
/// **Compatibility:** ink! v5 / pallet-contracts.
#[ink::contract]
mod simple_lottery {
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    // =========================================================================
    // CONSTANTS
    // =========================================================================

    /// Denominator for tier percentages. A tier holds a whole percentage of
    /// the pool, never a basis-point fraction.
    pub const PERCENT_DENOMINATOR: Balance = 100;

    // =========================================================================
    // TYPES
    // =========================================================================

    /// One prize bracket: a whole percentage of the pool split evenly among
    /// `count` winners. Position in the schedule is the rank; rank 0 draws
    /// first, from the full player pool.
    #[derive(scale::Encode, scale::Decode, Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct PrizeTier {
        pub percentage: u32,
        pub count: u32,
    }

    /// Correlation record for the single outstanding randomness request.
    /// `num_words` is the word count the oracle was asked for, already
    /// bounded by the player count at request time.
    #[derive(scale::Encode, scale::Decode, Clone, Copy, Debug, PartialEq, Eq)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct DrawRequest {
        pub request_id: u64,
        pub num_words: u32,
    }

    /// Cached outcome of one tier in the most recent draw. Overwritten
    /// wholesale by the next settlement and cleared wholesale whenever the
    /// prize schedule is replaced.
    #[derive(scale::Encode, scale::Decode, Clone, Debug, PartialEq, Eq)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct DrawResult {
        winners: Vec<AccountId>,
        prize_per_winner: Balance,
    }

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct SimpleLottery {
        /// Deployer / admin.
        owner: AccountId,

        /// The only account allowed to deliver randomness.
        oracle: AccountId,

        /// Exact price of one ticket; over- and under-payment are rejected.
        ticket_price: Balance,

        // ── Round state ───────────────────────────────────────────────────
        /// Whether the round currently accepts entries.
        lottery_open: bool,

        /// Set between `request_winner` and the oracle callback; while set,
        /// every mutating entry point except the callback is rejected.
        picking_in_progress: bool,

        /// Players of the current round, in entry order. An account may
        /// enter more than once and holds one slot per ticket.
        players: Vec<AccountId>,

        /// Sum of ticket payments accumulated for the current round.
        prize_pool: Balance,

        // ── Prize schedule ────────────────────────────────────────────────
        /// Ordered tiers, rank 0 first. Replaced only as a whole, and only
        /// while the round is closed and empty.
        prize_tiers: Vec<PrizeTier>,

        /// Per-tier outcome of the most recent draw.
        last_draw_results: Vec<DrawResult>,

        // ── Randomness bridge ─────────────────────────────────────────────
        /// Id minted for the next randomness request.
        next_request_id: u64,

        /// The outstanding request, if a draw is awaiting randomness.
        pending_draw: Option<DrawRequest>,

        /// Permanent replay ledger: request ids that have already been
        /// consumed. Never pruned.
        fulfilled_requests: Mapping<u64, bool>,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// A ticket was bought for the current round.
    #[ink(event)]
    pub struct LotteryEntered {
        #[ink(topic)]
        player: AccountId,
        amount: Balance,
    }

    /// The owner closed entries and asked the oracle for `num_words` random
    /// words bound to `request_id`.
    #[ink(event)]
    pub struct RandomWordsRequested {
        #[ink(topic)]
        request_id: u64,
        num_words: u32,
    }

    /// A winner was selected for a tier. Fires once per winner, in tier rank
    /// and selection order.
    #[ink(event)]
    pub struct TierWinnerPicked {
        #[ink(topic)]
        request_id: u64,
        tier_index: u32,
        #[ink(topic)]
        winner: AccountId,
        prize_amount: Balance,
    }

    /// Settlement of the draw bound to `request_id` finished.
    #[ink(event)]
    pub struct AllWinnersDistributed {
        #[ink(topic)]
        request_id: u64,
    }

    /// The round state was cleared after settlement; a new round may be
    /// opened.
    #[ink(event)]
    pub struct LotteryReset {
        #[ink(topic)]
        request_id: u64,
    }

    /// The prize schedule was replaced.
    #[ink(event)]
    pub struct PrizeConfigurationSet {
        total_tiers: u32,
        total_winners: u32,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// Caller is not the registered randomness oracle.
        NotOracle,
        /// The round is not open for entries.
        LotteryNotOpen,
        /// The round is currently open; close it before administering.
        LotteryOpen,
        /// A draw is awaiting randomness; the round cannot be touched.
        PickingInProgress,
        /// Payment does not exactly match the ticket price.
        WrongTicketPrice,
        /// A contract account attempted to buy a ticket.
        ContractCallerRejected,
        /// There are no players to draw from.
        NoPlayers,
        /// No prize schedule is configured.
        NoPrizeConfiguration,
        /// The configuration arrays are empty.
        EmptyConfiguration,
        /// The percentage and winner-count arrays differ in length.
        ConfigurationLengthMismatch,
        /// A tier percentage is outside [1, 100].
        InvalidTierPercentage,
        /// A tier winner count is zero.
        InvalidWinnerCount,
        /// The tier percentages sum to more than 100.
        PercentageSumTooHigh,
        /// Randomness delivered for an id that is not the outstanding request.
        UnknownRequest,
        /// Randomness already consumed for this request id.
        RequestAlreadyFulfilled,
        /// Withdrawal exceeds the contract balance.
        InsufficientBalance,
        /// The native transfer to the owner failed.
        TransferFailed,
        /// Arithmetic overflow.
        Overflow,
    }

    pub type Result<T> = core::result::Result<T, Error>;

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl SimpleLottery {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        /// Deploys with the round closed and no schedule configured. The
        /// deployer becomes the owner; `oracle` is the randomness account.
        #[ink(constructor)]
        pub fn new(ticket_price: Balance, oracle: AccountId) -> Self {
            Self {
                owner: Self::env().caller(),
                oracle,
                ticket_price,
                lottery_open: false,
                picking_in_progress: false,
                players: Vec::new(),
                prize_pool: 0,
                prize_tiers: Vec::new(),
                last_draw_results: Vec::new(),
                next_request_id: 1,
                pending_draw: None,
                fulfilled_requests: Mapping::default(),
            }
        }

        // =====================================================================
        // ROUND ENTRY
        // =====================================================================

        /// Buy one ticket for the current round. The transferred value must
        /// equal the ticket price exactly; contract accounts are turned away.
        #[ink(message, payable)]
        pub fn enter_lottery(&mut self) -> Result<()> {
            if !self.lottery_open {
                return Err(Error::LotteryNotOpen);
            }

            let caller = self.env().caller();
            self.reject_contract_caller(&caller)?;

            let paid = self.env().transferred_value();
            if paid != self.ticket_price {
                return Err(Error::WrongTicketPrice);
            }

            let pool = self.prize_pool.checked_add(paid).ok_or(Error::Overflow)?;
            self.players.push(caller);
            self.prize_pool = pool;

            self.env().emit_event(LotteryEntered {
                player: caller,
                amount: paid,
            });

            Ok(())
        }

        // =====================================================================
        // ROUND LIFECYCLE — Owner
        // =====================================================================

        /// Open a new round. Requires a configured schedule; the player list
        /// and pool are already empty from the previous settlement.
        #[ink(message)]
        pub fn open_lottery(&mut self) -> Result<()> {
            self.only_owner()?;
            self.assert_round_idle()?;

            if self.prize_tiers.is_empty() {
                return Err(Error::NoPrizeConfiguration);
            }

            self.lottery_open = true;
            Ok(())
        }

        /// Close entries and request randomness for the draw.
        ///
        /// The word count is bounded by the player count: tiers whose slots
        /// exceed the remaining players draw short, so words past
        /// `players.len()` could never be consumed.
        #[ink(message)]
        pub fn request_winner(&mut self) -> Result<()> {
            self.only_owner()?;

            if !self.lottery_open {
                return Err(Error::LotteryNotOpen);
            }
            if self.picking_in_progress {
                return Err(Error::PickingInProgress);
            }
            if self.players.is_empty() {
                return Err(Error::NoPlayers);
            }
            if self.prize_tiers.is_empty() {
                return Err(Error::NoPrizeConfiguration);
            }

            let num_words =
                (self.total_winners_to_pick() as usize).min(self.players.len()) as u32;

            let request_id = self.next_request_id;
            self.next_request_id = request_id.checked_add(1).ok_or(Error::Overflow)?;

            self.lottery_open = false;
            self.picking_in_progress = true;
            self.pending_draw = Some(DrawRequest {
                request_id,
                num_words,
            });

            self.env().emit_event(RandomWordsRequested {
                request_id,
                num_words,
            });

            Ok(())
        }

        // =====================================================================
        // RANDOMNESS FULFILLMENT — Oracle
        // =====================================================================

        /// Deliver the random words for an outstanding request and settle the
        /// round.
        ///
        /// A request id is consumed at most once, forever: the replay ledger
        /// is written before the first outward transfer, as are the round
        /// reset and the picking flag, so re-entrant calls from a payout
        /// recipient find the round closed and the request spent.
        #[ink(message)]
        pub fn fulfill_random_words(
            &mut self,
            request_id: u64,
            random_words: Vec<u64>,
        ) -> Result<()> {
            self.only_oracle()?;

            if self.fulfilled_requests.get(request_id).unwrap_or(false) {
                return Err(Error::RequestAlreadyFulfilled);
            }
            match self.pending_draw {
                Some(pending) if pending.request_id == request_id => {}
                _ => return Err(Error::UnknownRequest),
            }

            // Guard state first, transfers last.
            self.fulfilled_requests.insert(request_id, &true);
            self.pending_draw = None;
            self.picking_in_progress = false;

            let pool = self.prize_pool;
            let eligible = self.players.clone();
            self.players.clear();
            self.prize_pool = 0;

            self.settle(request_id, &random_words, eligible, pool);

            self.env().emit_event(AllWinnersDistributed { request_id });
            self.env().emit_event(LotteryReset { request_id });

            Ok(())
        }

        // =====================================================================
        // INTERNAL — Draw & Settlement
        // =====================================================================

        /// Select winners tier by tier, without replacement, and push out the
        /// payouts.
        ///
        /// Ranks settle in schedule order, so the largest bracket draws from
        /// the full pool. Each selected player leaves the eligible pool with
        /// an order-preserving removal; the remaining players keep their
        /// relative entry order, which makes every selection reproducible
        /// from the word sequence alone.
        ///
        /// Both divisions floor; the residue of percentage rounding and
        /// uneven splits stays in the contract balance and is reachable only
        /// through `withdraw` once the round is idle. A tier that runs out of
        /// eligible players, or out of random words, simply draws short.
        fn settle(
            &mut self,
            request_id: u64,
            random_words: &[u64],
            mut eligible: Vec<AccountId>,
            pool: Balance,
        ) {
            let tiers = self.prize_tiers.clone();
            let mut results = Vec::with_capacity(tiers.len());
            let mut word_index = 0usize;

            for (tier_index, tier) in tiers.iter().enumerate() {
                let tier_total =
                    pool.saturating_mul(tier.percentage as Balance) / PERCENT_DENOMINATOR;
                let winners_needed = (tier.count as usize).min(eligible.len());

                let mut winners: Vec<AccountId> = Vec::with_capacity(winners_needed);
                for _ in 0..winners_needed {
                    let word = match random_words.get(word_index) {
                        Some(word) => *word,
                        None => break,
                    };
                    let idx = (word % eligible.len() as u64) as usize;
                    winners.push(eligible.remove(idx));
                    word_index += 1;
                }

                let prize_per_winner = if winners.is_empty() {
                    0
                } else {
                    tier_total / winners.len() as Balance
                };

                for winner in &winners {
                    // A recipient that refuses the payout forfeits it; the
                    // draw must finish for the remaining winners.
                    let _ = self.env().transfer(*winner, prize_per_winner);

                    self.env().emit_event(TierWinnerPicked {
                        request_id,
                        tier_index: tier_index as u32,
                        winner: *winner,
                        prize_amount: prize_per_winner,
                    });
                }

                results.push(DrawResult {
                    winners,
                    prize_per_winner,
                });
            }

            self.last_draw_results = results;
        }

        // =====================================================================
        // ADMIN
        // =====================================================================

        /// Replace the prize schedule as a whole. Only while the round is
        /// closed and empty; the previous draw's cached results are discarded
        /// so a reshaped schedule cannot serve stale winners.
        #[ink(message)]
        pub fn set_prize_configuration(
            &mut self,
            percentages: Vec<u32>,
            counts: Vec<u32>,
        ) -> Result<()> {
            self.only_owner()?;
            self.assert_round_idle()?;

            if percentages.is_empty() {
                return Err(Error::EmptyConfiguration);
            }
            if percentages.len() != counts.len() {
                return Err(Error::ConfigurationLengthMismatch);
            }

            let mut percentage_sum: u32 = 0;
            let mut total_winners: u32 = 0;
            for (percentage, count) in percentages.iter().zip(counts.iter()) {
                if *percentage == 0 || *percentage > 100 {
                    return Err(Error::InvalidTierPercentage);
                }
                if *count == 0 {
                    return Err(Error::InvalidWinnerCount);
                }
                percentage_sum = percentage_sum.saturating_add(*percentage);
                if percentage_sum > 100 {
                    return Err(Error::PercentageSumTooHigh);
                }
                total_winners = total_winners.saturating_add(*count);
            }

            self.prize_tiers = percentages
                .iter()
                .zip(counts.iter())
                .map(|(percentage, count)| PrizeTier {
                    percentage: *percentage,
                    count: *count,
                })
                .collect();
            self.last_draw_results = Vec::new();

            self.env().emit_event(PrizeConfigurationSet {
                total_tiers: self.prize_tiers.len() as u32,
                total_winners,
            });

            Ok(())
        }

        /// Change the ticket price. Only between rounds, so the economics of
        /// a round never move under its players.
        #[ink(message)]
        pub fn set_ticket_price(&mut self, new_price: Balance) -> Result<()> {
            self.only_owner()?;
            self.assert_round_idle()?;
            self.ticket_price = new_price;
            Ok(())
        }

        /// Rotate the randomness account. Only between rounds; an outstanding
        /// request stays bound to the oracle that was asked.
        #[ink(message)]
        pub fn set_oracle(&mut self, new_oracle: AccountId) -> Result<()> {
            self.only_owner()?;
            self.assert_round_idle()?;
            self.oracle = new_oracle;
            Ok(())
        }

        /// Withdraw undistributed funds (division residue, unreached tier
        /// shares) to the owner. Only while the round is closed and empty, so
        /// escrowed prize money can never be drained mid-round.
        #[ink(message)]
        pub fn withdraw(&mut self, amount: Balance) -> Result<()> {
            self.only_owner()?;
            self.assert_round_idle()?;

            if amount > self.env().balance() {
                return Err(Error::InsufficientBalance);
            }

            self.env()
                .transfer(self.owner, amount)
                .map_err(|_| Error::TransferFailed)
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn ticket_price(&self) -> Balance {
            self.ticket_price
        }

        #[ink(message)]
        pub fn get_prize_pool(&self) -> Balance {
            self.prize_pool
        }

        #[ink(message)]
        pub fn get_lottery_status(&self) -> bool {
            self.lottery_open
        }

        #[ink(message)]
        pub fn is_winner_picking_in_progress(&self) -> bool {
            self.picking_in_progress
        }

        #[ink(message)]
        pub fn owner(&self) -> AccountId {
            self.owner
        }

        #[ink(message)]
        pub fn get_oracle(&self) -> AccountId {
            self.oracle
        }

        #[ink(message)]
        pub fn get_players(&self) -> Vec<AccountId> {
            self.players.clone()
        }

        #[ink(message)]
        pub fn get_prize_tier_configuration_count(&self) -> u32 {
            self.prize_tiers.len() as u32
        }

        #[ink(message)]
        pub fn get_prize_tier_config(&self, tier_index: u32) -> Option<PrizeTier> {
            self.prize_tiers.get(tier_index as usize).copied()
        }

        /// Sum of winner slots across all tiers.
        #[ink(message)]
        pub fn total_winners_to_pick(&self) -> u32 {
            self.prize_tiers
                .iter()
                .fold(0u32, |acc, tier| acc.saturating_add(tier.count))
        }

        /// Winners of the given tier in the most recent draw. Empty if the
        /// tier drew no winners or the schedule was replaced since.
        #[ink(message)]
        pub fn get_last_draw_tier_winners(&self, tier_index: u32) -> Vec<AccountId> {
            self.last_draw_results
                .get(tier_index as usize)
                .map(|result| result.winners.clone())
                .unwrap_or_default()
        }

        #[ink(message)]
        pub fn get_last_draw_tier_prize_per_winner(&self, tier_index: u32) -> Balance {
            self.last_draw_results
                .get(tier_index as usize)
                .map(|result| result.prize_per_winner)
                .unwrap_or(0)
        }

        #[ink(message)]
        pub fn get_contract_balance(&self) -> Balance {
            self.env().balance()
        }

        #[ink(message)]
        pub fn get_pending_request(&self) -> Option<DrawRequest> {
            self.pending_draw
        }

        #[ink(message)]
        pub fn is_request_fulfilled(&self, request_id: u64) -> bool {
            self.fulfilled_requests.get(request_id).unwrap_or(false)
        }

        // =====================================================================
        // ACCESS CONTROL
        // =====================================================================

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }

        fn only_oracle(&self) -> Result<()> {
            if self.env().caller() != self.oracle {
                return Err(Error::NotOracle);
            }
            Ok(())
        }

        /// The round must be closed with no draw outstanding. Players can
        /// only be non-empty while open or picking, so an idle round is
        /// always empty as well.
        fn assert_round_idle(&self) -> Result<()> {
            if self.lottery_open {
                return Err(Error::LotteryOpen);
            }
            if self.picking_in_progress {
                return Err(Error::PickingInProgress);
            }
            Ok(())
        }

        /// Tickets are for externally owned accounts only; a caller with code
        /// is turned away at the boundary. The code-presence probe is a host
        /// call, available to the on-chain build.
        #[cfg(not(feature = "std"))]
        fn reject_contract_caller(&self, caller: &AccountId) -> Result<()> {
            if self.env().is_contract(caller) {
                return Err(Error::ContractCallerRejected);
            }
            Ok(())
        }

        /// The off-chain engine keeps no code registry for callers; every
        /// caller counts as externally owned.
        #[cfg(feature = "std")]
        fn reject_contract_caller(&self, _caller: &AccountId) -> Result<()> {
            Ok(())
        }
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
