pub mod read_pars;
pub mod sim_opts;
