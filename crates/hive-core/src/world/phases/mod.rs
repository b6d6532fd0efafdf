mod evolution;
mod prune;
mod reproduction;
mod think;
mod toxin;
