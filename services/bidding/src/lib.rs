pub mod ranking;


pub use ranking::{rank_bids, score_bid, Bid, RankedBid, RankingContext, RankingWeights, ScoreComponents};
