//! Initial catalog: class templates, trainers, the weekly schedule and testimonials.

use crate::models::{ClassLevel, ClassTemplate, ScheduleSlot, Testimonial, Trainer};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn classes() -> Vec<ClassTemplate> {
    vec![
        ClassTemplate {
            id: "beginner-fog-cutter".to_string(),
            name: "Beginner (Fog Cutter)".to_string(),
            description: "From FiDi desk jockeys to Mission artists - find your fit".to_string(),
            level: ClassLevel::Beginner,
            duration_minutes: 60,
            max_capacity: 20,
            price: 25,
            instructor_id: "maria-gonzalez".to_string(),
        },
        ClassTemplate {
            id: "intermediate-bay-bridger".to_string(),
            name: "Intermediate (Bay Bridger)".to_string(),
            description: "Progress to the next level with advanced combinations".to_string(),
            level: ClassLevel::Intermediate,
            duration_minutes: 75,
            max_capacity: 15,
            price: 35,
            instructor_id: "raul-mendoza".to_string(),
        },
        ClassTemplate {
            id: "advanced-twin-peaks".to_string(),
            name: "Advanced (Twin Peaks Climber)".to_string(),
            description: "Elite training for competitive boxers".to_string(),
            level: ClassLevel::Advanced,
            duration_minutes: 90,
            max_capacity: 12,
            price: 45,
            instructor_id: "jamal-chen".to_string(),
        },
    ]
}

pub fn trainers() -> Vec<Trainer> {
    vec![
        Trainer {
            id: "maria-gonzalez".to_string(),
            name: "Maria 'Mission' Gonzalez".to_string(),
            bio: "5x NorCal Golden Gloves, teaches footwork like a Tango dancer in the Mission"
                .to_string(),
            specialties: strings(&["Beginner Training", "Footwork", "Technique"]),
            experience_label: "8 years".to_string(),
            hourly_rate: 85,
            availability: strings(&["Monday", "Wednesday", "Friday"]),
        },
        Trainer {
            id: "raul-mendoza".to_string(),
            name: "Raúl 'The Firewall' Mendoza".to_string(),
            bio: "Trained at King's Gym (Tenderloin) during the '90s. Specialty: Surviving 'Civic Center Clinches'".to_string(),
            specialties: strings(&["Defense", "Sparring", "Competition Prep"]),
            experience_label: "15 years".to_string(),
            hourly_rate: 95,
            availability: strings(&["Tuesday", "Thursday", "Saturday"]),
        },
        Trainer {
            id: "jamal-chen".to_string(),
            name: "Jamal 'The Technician' Chen".to_string(),
            bio: "NASM Certified. Transformed 200+ SF tech workers from keyboard warriors to ring warriors".to_string(),
            specialties: strings(&["Technical Boxing", "Strength Training", "Form Correction"]),
            experience_label: "10 years".to_string(),
            hourly_rate: 90,
            availability: strings(&["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"]),
        },
    ]
}

#[allow(clippy::too_many_arguments)]
fn slot(
    id: &str,
    class_template_id: &str,
    day: &str,
    time: &str,
    duration_minutes: u32,
    instructor_id: &str,
    current_bookings: u32,
    max_capacity: u32,
) -> ScheduleSlot {
    ScheduleSlot {
        id: id.to_string(),
        class_template_id: class_template_id.to_string(),
        day: day.to_string(),
        time: time.to_string(),
        duration_minutes,
        instructor_id: instructor_id.to_string(),
        current_bookings,
        max_capacity,
    }
}

#[rustfmt::skip]
pub fn schedule() -> Vec<ScheduleSlot> {
    vec![
        slot("mon-6am-beginner", "beginner-fog-cutter", "Monday", "06:00", 60, "maria-gonzalez", 8, 20),
        slot("mon-7pm-intermediate", "intermediate-bay-bridger", "Monday", "19:00", 75, "raul-mendoza", 12, 15),
        slot("tue-12pm-beginner", "beginner-fog-cutter", "Tuesday", "12:00", 60, "maria-gonzalez", 15, 20),
        slot("wed-6pm-advanced", "advanced-twin-peaks", "Wednesday", "18:00", 90, "jamal-chen", 5, 12),
    ]
}

pub fn testimonials() -> Vec<Testimonial> {
    vec![
        Testimonial {
            id: "sarah-soma".to_string(),
            name: "Sarah K.".to_string(),
            location: "SoMa".to_string(),
            quote: "Shredded my pandemic 'Dolores Park bod' in 8 weeks! More energizing than Philz coffee.".to_string(),
            rating: 5,
            program: "Bootcamp".to_string(),
        },
        Testimonial {
            id: "diego-sunset".to_string(),
            name: "Diego R.".to_string(),
            location: "Sunset".to_string(),
            quote: "Went from shy to school champ. Coaches here are like family.".to_string(),
            rating: 5,
            program: "Youth Boxing".to_string(),
        },
    ]
}
