//! Parser for the responsive image candidate list (`srcset` attribute)
//!
//! Each candidate is `<url> [<descriptor>]*` where a descriptor is a number
//! followed by `w` (width) or `x` (pixel density). Height descriptors are
//! rejected. Strict mode adds the cross-candidate rules: one descriptor per
//! candidate, a single fallback candidate that may not coexist with `1x`, and
//! no repeated descriptor. Unlike post extraction this parser fails fast: the
//! first violated rule aborts the parse.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

static IMAGE_CANDIDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s*([^,]\S*[^,](?:\s+[^,]+)?)\s*(?:,|$)").expect("invalid `IMAGE_CANDIDATE`")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SrcSetMode {
    #[default]
    Lenient,
    Strict,
}

/// One entry of a `srcset` attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SrcSetCandidate {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Never populated: height descriptors are rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub density: Option<f64>,
}

impl SrcSetCandidate {
    fn bare(url: &str) -> Self {
        Self {
            url: url.to_string(),
            width: None,
            height: None,
            density: None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SrcSetError {
    #[error("{descriptor} is not a valid number")]
    InvalidNumber { descriptor: String },

    #[error("Width descriptor must be greater than zero")]
    NonPositiveWidth,

    #[error("Width descriptor must be an integer")]
    NonIntegerWidth,

    #[error("Width descriptor is too large: {descriptor}")]
    WidthOutOfRange { descriptor: String },

    #[error("Pixel density descriptor must be greater than zero")]
    NonPositiveDensity,

    #[error("Height descriptor is no longer allowed")]
    HeightDescriptor,

    #[error("Invalid srcset descriptor: {descriptor}")]
    UnknownDescriptor { descriptor: String },

    #[error("Image candidate may have no more than one descriptor, found {count}: {descriptors}")]
    TooManyDescriptors { count: usize, descriptors: String },

    #[error("Only one fallback image candidate is allowed")]
    DuplicateFallback,

    #[error("A fallback image is equivalent to a 1x descriptor, providing both is invalid.")]
    FallbackWithDensityOne,

    #[error("No more than one image candidate is allowed for a given descriptor: {descriptor}")]
    DuplicateDescriptor { descriptor: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Descriptor {
    Width(u32),
    Density(f64),
}

impl Descriptor {
    fn parse(token: &str) -> Result<Self, SrcSetError> {
        let Some(postfix) = token.chars().last() else {
            return Err(SrcSetError::InvalidNumber {
                descriptor: token.to_string(),
            });
        };
        let body = &token[..token.len() - postfix.len_utf8()];
        let value = body
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| SrcSetError::InvalidNumber {
                descriptor: token.to_string(),
            })?;

        match postfix {
            'w' => {
                if value <= 0.0 {
                    Err(SrcSetError::NonPositiveWidth)
                } else if value.fract() != 0.0 {
                    Err(SrcSetError::NonIntegerWidth)
                } else if value > f64::from(u32::MAX) {
                    Err(SrcSetError::WidthOutOfRange {
                        descriptor: token.to_string(),
                    })
                } else {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    let width = value as u32;
                    Ok(Self::Width(width))
                }
            }
            'x' if value <= 0.0 => Err(SrcSetError::NonPositiveDensity),
            'x' => Ok(Self::Density(value)),
            'h' => Err(SrcSetError::HeightDescriptor),
            _ => Err(SrcSetError::UnknownDescriptor {
                descriptor: token.to_string(),
            }),
        }
    }

    fn is_density_one(self) -> bool {
        matches!(self, Self::Density(d) if d == 1.0)
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Width(w) => write!(f, "{w}w"),
            Self::Density(d) => write!(f, "{d}x"),
        }
    }
}

/// Strict-mode record of what the attribute has declared so far.
/// Lives for a single `parse` call.
#[derive(Debug, Default)]
struct DescriptorLedger {
    seen: HashSet<String>,
    has_fallback: bool,
}

impl DescriptorLedger {
    fn record_fallback(mut self) -> Result<Self, SrcSetError> {
        if self.has_fallback {
            return Err(SrcSetError::DuplicateFallback);
        }
        if self.seen.contains("1x") {
            return Err(SrcSetError::FallbackWithDensityOne);
        }
        self.has_fallback = true;
        Ok(self)
    }

    fn record(mut self, descriptor: Descriptor) -> Result<Self, SrcSetError> {
        if descriptor.is_density_one() && self.has_fallback {
            return Err(SrcSetError::FallbackWithDensityOne);
        }
        let key = descriptor.to_string();
        if self.seen.contains(&key) {
            return Err(SrcSetError::DuplicateDescriptor { descriptor: key });
        }
        self.seen.insert(key);
        Ok(self)
    }
}

/// Parse a `srcset` attribute value into its candidates, in order
pub fn parse(value: &str, mode: SrcSetMode) -> Result<Vec<SrcSetCandidate>, SrcSetError> {
    let (candidates, _ledger) = IMAGE_CANDIDATE
        .captures_iter(value)
        .filter_map(|captures| captures.get(1))
        .try_fold(
            (Vec::new(), DescriptorLedger::default()),
            |(mut candidates, ledger), raw| {
                let (candidate, ledger) = parse_candidate(raw.as_str(), mode, ledger)?;
                candidates.push(candidate);
                Ok::<_, SrcSetError>((candidates, ledger))
            },
        )?;
    Ok(candidates)
}

fn parse_candidate(
    raw: &str,
    mode: SrcSetMode,
    mut ledger: DescriptorLedger,
) -> Result<(SrcSetCandidate, DescriptorLedger), SrcSetError> {
    let mut tokens = raw.split_whitespace();
    let mut candidate = SrcSetCandidate::bare(tokens.next().unwrap_or_default());
    let descriptors: Vec<&str> = tokens.collect();
    let strict = mode == SrcSetMode::Strict;

    if strict {
        match descriptors.len() {
            0 => ledger = ledger.record_fallback()?,
            1 => {}
            count => {
                return Err(SrcSetError::TooManyDescriptors {
                    count,
                    descriptors: descriptors.join(" "),
                })
            }
        }
    }

    for token in descriptors {
        let descriptor = Descriptor::parse(token)?;
        if strict {
            ledger = ledger.record(descriptor)?;
        }
        match descriptor {
            Descriptor::Width(width) => candidate.width = Some(width),
            Descriptor::Density(density) => candidate.density = Some(density),
        }
    }

    Ok((candidate, ledger))
}
