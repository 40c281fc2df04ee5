/// Compiled fallbacks for everything the campaign file may leave out.
pub struct DefaultsConfig {
    pub forcefield_stem: String,
    pub structure_stem: String,
    pub equilibration_control_stem: String,
    pub equilibration_output_stem: String,
    pub production_control_stem: String,
    pub production_output_stem: String,
    pub replicate_summary_file: String,
    pub aggregate_summary_file: String,
    pub equilibration_steps: u64,
    pub production_steps: u64,
    pub initial_equilibration_steps: u64,
    pub console_freq: u64,
    pub block_average_freq: u64,
    pub coordinate_freq: u64,
    pub rcut_ang: f64,
    pub rcut_low_equilibration_ang: f64,
    pub rcut_low_production_ang: f64,
    pub long_range_correction: bool,
    pub exclude: String,
    pub ewald: bool,
    pub electrostatics: bool,
    pub displacement_freq: f64,
    pub rotation_freq: f64,
    pub volume_freq: f64,
    pub multi_particle_freq: f64,
    pub ncpu: u32,
    pub ngpu: u32,
    pub residue_name: String,
    pub total_molecules: u32,
    pub box_edge_ang: f64,
    pub step_start: u64,
    pub step_finish: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            forcefield_stem: "SPCE_FF".to_string(),
            structure_stem: "initial_box_0".to_string(),
            equilibration_control_stem: "NPT_equil".to_string(),
            equilibration_output_stem: "SPCE_equil".to_string(),
            production_control_stem: "NPT_prod".to_string(),
            production_output_stem: "SPCE_prod".to_string(),
            replicate_summary_file: "averages_box_liq.txt".to_string(),
            aggregate_summary_file: "averages_box_liq_replicates.txt".to_string(),
            equilibration_steps: 60_000_000,
            production_steps: 60_000_000,
            initial_equilibration_steps: 1_000,
            console_freq: 100_000,
            block_average_freq: 10_000_000,
            coordinate_freq: 10_000_000,
            rcut_ang: 10.0,
            rcut_low_equilibration_ang: 1.0,
            rcut_low_production_ang: 0.7,
            long_range_correction: true,
            exclude: "1-4".to_string(),
            ewald: true,
            electrostatics: true,
            displacement_freq: 0.48,
            rotation_freq: 0.49,
            volume_freq: 0.02,
            multi_particle_freq: 0.01,
            ncpu: 8,
            ngpu: 0,
            residue_name: "WAT".to_string(),
            total_molecules: 500,
            box_edge_ang: 25.0,
            step_start: 0,
            step_finish: 1_000_000_000_000,
        }
    }
}
