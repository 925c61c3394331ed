mod masked_cross_entropy;

pub(in crate::nn) use masked_cross_entropy::MaskedCrossEntropy;
