pub mod cds;
pub mod cli;
pub mod clm;
pub mod download;
pub mod fluxnet;
pub mod modis;
