use crate::approval::ApprovalIndex;
use crate::openalex::Work;

/// Drop works whose id is already approved. Input order is kept.
pub fn filter_unapproved(candidates: Vec<Work>, approved: &ApprovalIndex) -> Vec<Work> {
	candidates
		.into_iter()
		.filter(|work| !approved.contains(&work.id))
		.collect()
}
