use rand::{seq::SliceRandom, Rng};

use super::{DatasetError, Feedback, Review};

/// Downsample the majority label so both labels have the same number of rows.
///
/// The majority partition is sampled uniformly without replacement down to the size of the
/// minority partition, and the sample is followed by the full minority partition. Row order is
/// not otherwise meaningful, so callers shuffle downstream. Fails when either label has no rows.
pub fn balance<R: Rng + ?Sized>(
    reviews: Vec<Review>,
    rng: &mut R,
) -> Result<Vec<Review>, DatasetError> {
    let (negative, positive): (Vec<_>, Vec<_>) = reviews
        .into_iter()
        .partition(|review| review.feedback == Feedback::Negative);

    if negative.is_empty() {
        return Err(DatasetError::EmptyClass(Feedback::Negative));
    }

    if positive.is_empty() {
        return Err(DatasetError::EmptyClass(Feedback::Positive));
    }

    let (majority, minority) = if positive.len() >= negative.len() {
        (positive, negative)
    } else {
        (negative, positive)
    };

    let n = minority.len();

    let mut balanced: Vec<Review> = majority.choose_multiple(rng, n).cloned().collect();
    balanced.extend(minority);

    log::debug!("Balanced corpus to {} rows per label", n);

    Ok(balanced)
}
