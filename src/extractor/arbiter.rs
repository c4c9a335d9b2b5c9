//! Conflict resolution across probe results

use super::FoundToken;
use super::probe::Channel;
use crate::error::ExtractionError;

/// Decide the outcome from every probe's answer
///
/// No token is `Unauthorized`, exactly one is returned as-is, and two or more
/// are `BadRequest` whatever their values. Input order never matters.
pub fn arbitrate<'a, I>(results: I) -> Result<FoundToken<'a>, ExtractionError>
where
    I: IntoIterator<Item = (Channel, Option<&'a str>)>,
{
    let mut found = results
        .into_iter()
        .filter_map(|(channel, value)| value.map(|value| FoundToken { channel, value }));

    let first = found.next().ok_or(ExtractionError::Unauthorized)?;
    if found.next().is_some() {
        return Err(ExtractionError::BadRequest);
    }
    Ok(first)
}
