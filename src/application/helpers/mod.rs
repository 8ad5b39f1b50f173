pub mod installment_split;
